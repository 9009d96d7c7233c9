//! Process enumeration and CPU sampling from `/proc/[pid]/`.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::collector::procfs::error::CollectError;
use crate::collector::procfs::parser::{UserResolver, parse_cpu_ticks, parse_proc_status};
use crate::collector::traits::FileSystem;
use crate::model::ProcessSample;
use crate::util::clock_ticks_per_second;

/// Default length of the CPU sampling window.
pub const DEFAULT_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Returns true if `name` is a process id directory name (ASCII digits only).
fn is_pid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Lists the numeric entries of `proc_path` as process ids.
///
/// Order follows the directory listing and is unspecified.
pub fn enumerate_pids<F: FileSystem>(fs: &F, proc_path: &str) -> Result<Vec<u32>, CollectError> {
    let entries = fs.read_dir(Path::new(proc_path))?;

    Ok(entries
        .iter()
        .filter_map(|entry| entry.file_name().and_then(|n| n.to_str()))
        .filter(|name| is_pid_name(name))
        .filter_map(|name| name.parse::<u32>().ok())
        .collect())
}

/// CPU usage in percent of one CPU for `ticks` consumed during one second.
fn cpu_usage(first: u64, second: u64, clock_ticks: u64) -> f64 {
    second.saturating_sub(first) as f64 / clock_ticks as f64 * 100.0
}

/// Rescales `usage` measured over `elapsed` to the nominal `window`.
///
/// A process sampled late in a long pass sees more than `window` between its
/// two reads. A zero window leaves usage unscaled, and `elapsed` never counts
/// as shorter than `window`.
fn scale_to_window(usage: f64, window: Duration, elapsed: Duration) -> f64 {
    if window.is_zero() {
        return usage;
    }
    let window = window.as_secs_f64();
    usage * window / elapsed.as_secs_f64().max(window)
}

/// A process whose status and first CPU sample have been read.
#[derive(Debug, Clone)]
pub struct PendingSample {
    sample: ProcessSample,
    first_ticks: u64,
    first_at: Instant,
}

impl PendingSample {
    pub fn pid(&self) -> u32 {
        self.sample.pid
    }
}

/// Samples memory and CPU usage of every process under `/proc`.
///
/// Sampling runs in two phases: [`begin`](Self::begin) reads each process's
/// status and first tick counter, [`complete`](Self::complete) reads the
/// second counter. [`sample_all`](Self::sample_all) waits one window between
/// them, so all processes share the same wait.
pub struct ProcessSampler<F: FileSystem> {
    fs: F,
    proc_path: String,
    clock_ticks: u64,
    window: Duration,
    users: UserResolver,
}

impl<F: FileSystem> ProcessSampler<F> {
    /// Creates a new process sampler.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            clock_ticks: clock_ticks_per_second(),
            window: DEFAULT_SAMPLE_WINDOW,
            users: UserResolver::new(),
        }
    }

    /// Overrides the wait between the two CPU samples.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Overrides the clock tick rate reported by the platform.
    pub fn with_clock_ticks(mut self, clock_ticks: u64) -> Self {
        self.clock_ticks = clock_ticks.max(1);
        self
    }

    /// Sets the resolver used to fill in process owners.
    pub fn with_user_resolver(mut self, users: UserResolver) -> Self {
        self.users = users;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn read_ticks(&self, pid: u32) -> Result<u64, CollectError> {
        let path = format!("{}/{}/stat", self.proc_path, pid);
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|_| CollectError::ProcessGone(pid))?;
        Ok(parse_cpu_ticks(&content)?)
    }

    fn begin_process(&self, pid: u32) -> Result<PendingSample, CollectError> {
        let status_path = format!("{}/{}/status", self.proc_path, pid);
        let content = self
            .fs
            .read_to_string(Path::new(&status_path))
            .map_err(|_| CollectError::ProcessGone(pid))?;
        let status = parse_proc_status(&content)?;
        let first_ticks = self.read_ticks(pid)?;
        let first_at = Instant::now();

        Ok(PendingSample {
            sample: ProcessSample {
                pid,
                user: status
                    .uid
                    .map(|uid| self.users.resolve(uid))
                    .unwrap_or_default(),
                vm_rss: status.vm_rss,
                vm_size: status.vm_size,
                name: status.name,
                cpu_usage: 0.0,
            },
            first_ticks,
            first_at,
        })
    }

    /// Reads status and the first CPU sample of every process.
    ///
    /// Any process that cannot be read aborts the whole pass.
    pub fn begin(&self) -> Result<Vec<PendingSample>, CollectError> {
        enumerate_pids(&self.fs, &self.proc_path)?
            .into_iter()
            .map(|pid| self.begin_process(pid))
            .collect()
    }

    /// Reads the second CPU sample of every pending process.
    ///
    /// A process that exited since [`begin`](Self::begin) keeps its first
    /// sample and reports 0% usage. Usage is scaled to the configured window
    /// when the time between a process's two reads exceeds it.
    pub fn complete(&self, pending: Vec<PendingSample>) -> Vec<ProcessSample> {
        pending
            .into_iter()
            .map(|p| {
                let second_ticks = self.read_ticks(p.pid()).unwrap_or(p.first_ticks);
                let usage = cpu_usage(p.first_ticks, second_ticks, self.clock_ticks);
                ProcessSample {
                    cpu_usage: scale_to_window(usage, self.window, p.first_at.elapsed()),
                    ..p.sample
                }
            })
            .collect()
    }

    /// Samples all processes over one window.
    pub fn sample_all(&self) -> Result<Vec<ProcessSample>, CollectError> {
        let start = Instant::now();
        let pending = self.begin()?;
        if !self.window.is_zero() {
            thread::sleep(self.window);
        }
        let samples = self.complete(pending);
        debug!(
            processes = samples.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "process sampling done"
        );
        Ok(samples)
    }
}
