//! Main collector that combines the memory reader, allocator probe and
//! process sampler.
//!
//! The `Collector` struct provides a unified interface for building one
//! `MemorySnapshot` per request.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::collector::allocator::AllocatorProbe;
use crate::collector::procfs::{CollectError, ProcessSampler, SystemCollector, UserResolver};
use crate::collector::traits::FileSystem;
use crate::model::{InstanceId, MemTotals, MemorySnapshot};

/// Process sampling failed; the memory-only part of the snapshot survives.
#[derive(Debug, thiserror::Error)]
#[error("process list unavailable: {source}")]
pub struct Degraded {
    /// Snapshot with system and allocator counters and no process entries.
    pub snapshot: MemorySnapshot,
    #[source]
    pub source: CollectError,
}

/// Timing information for each collector phase.
///
/// Used for debugging and performance monitoring.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total snapshot collection time.
    pub total: Duration,
    /// Time to read `/proc/meminfo`.
    pub meminfo: Duration,
    /// Time to sample processes, including the sampling window.
    pub processes: Duration,
}

/// Main collector that gathers all memory metrics.
pub struct Collector<F: FileSystem + Clone, A: AllocatorProbe> {
    system_collector: SystemCollector<F>,
    process_sampler: ProcessSampler<F>,
    allocator: A,
}

impl<F: FileSystem + Clone, A: AllocatorProbe> Collector<F, A> {
    /// Default location of the user database.
    pub const DEFAULT_PASSWD_PATH: &'static str = "/etc/passwd";

    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    /// * `allocator` - Source of allocator counters
    pub fn new(fs: F, proc_path: impl Into<String>, allocator: A) -> Self {
        Self::with_passwd(fs, proc_path, Self::DEFAULT_PASSWD_PATH, allocator)
    }

    /// Creates a new collector that resolves process owners from `passwd_path`.
    ///
    /// A missing passwd file is not an error: owners are then reported as
    /// numeric UIDs.
    pub fn with_passwd(
        fs: F,
        proc_path: impl Into<String>,
        passwd_path: impl AsRef<Path>,
        allocator: A,
    ) -> Self {
        let proc_path = proc_path.into();

        let mut users = UserResolver::new();
        match fs.read_to_string(passwd_path.as_ref()) {
            Ok(content) => {
                users.load_from_content(&content);
                if !users.is_loaded() {
                    warn!(
                        path = %passwd_path.as_ref().display(),
                        "user database has no entries, owners will be numeric"
                    );
                }
            }
            Err(e) => warn!(
                path = %passwd_path.as_ref().display(),
                error = %e,
                "user database unavailable, owners will be numeric"
            ),
        }

        Self {
            system_collector: SystemCollector::new(fs.clone(), &proc_path),
            process_sampler: ProcessSampler::new(fs, &proc_path).with_user_resolver(users),
            allocator,
        }
    }

    /// Overrides the CPU sampling window.
    pub fn with_sample_window(mut self, window: Duration) -> Self {
        self.process_sampler = self.process_sampler.with_window(window);
        self
    }

    /// Overrides the clock tick rate.
    pub fn with_clock_ticks(mut self, clock_ticks: u64) -> Self {
        self.process_sampler = self.process_sampler.with_clock_ticks(clock_ticks);
        self
    }

    /// Process sampler used for the `psEntries` pass.
    pub fn process_sampler(&self) -> &ProcessSampler<F> {
        &self.process_sampler
    }

    /// Builds one snapshot.
    ///
    /// A failed `/proc/meminfo` read is logged and leaves the totals at zero.
    /// A failed process pass returns [`Degraded`] carrying the snapshot
    /// without process entries.
    pub fn collect(&self, id: InstanceId) -> Result<MemorySnapshot, Degraded> {
        self.collect_timed(id).0
    }

    /// Same as [`collect`](Self::collect), also reporting phase timings.
    pub fn collect_timed(
        &self,
        id: InstanceId,
    ) -> (Result<MemorySnapshot, Degraded>, CollectorTiming) {
        let mut timing = CollectorTiming::default();
        let total_start = Instant::now();

        let start = Instant::now();
        let totals = self
            .system_collector
            .read_memory_stats()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to read memory stats, totals left at zero");
                MemTotals::default()
            });
        timing.meminfo = start.elapsed();

        let mut snapshot = MemorySnapshot::new(id, totals, self.allocator.read());

        let start = Instant::now();
        let processes = self.process_sampler.sample_all();
        timing.processes = start.elapsed();
        timing.total = total_start.elapsed();

        debug!(
            meminfo_us = timing.meminfo.as_micros() as u64,
            processes_ms = timing.processes.as_millis() as u64,
            total_ms = timing.total.as_millis() as u64,
            "snapshot collected"
        );

        let result = match processes {
            Ok(samples) => {
                snapshot.ps_entries = samples;
                Ok(snapshot)
            }
            Err(source) => Err(Degraded { snapshot, source }),
        };
        (result, timing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::allocator::FixedProbe;
    use crate::collector::mock::MockFs;
    use crate::model::AllocatorStats;

    fn collector(fs: MockFs) -> Collector<MockFs, FixedProbe> {
        let probe = FixedProbe(AllocatorStats::from_bytes(4096, 8192, 1024, 16384, 32768, 0));
        Collector::new(fs, "/proc", probe)
            .with_sample_window(Duration::ZERO)
            .with_clock_ticks(100)
    }

    fn id() -> InstanceId {
        "1a2b3c4d".parse().unwrap()
    }

    #[test]
    fn test_collect_snapshot() {
        let snapshot = collector(MockFs::typical_system()).collect(id()).unwrap();

        assert_eq!(snapshot.id, id());
        assert_eq!(snapshot.total, 16384000);
        assert_eq!(snapshot.free, 8192000);
        assert_eq!(snapshot.available, 12000000);
        assert_eq!(snapshot.runtime_memory_stats.alloc, 4.0);
        assert_eq!(snapshot.runtime_memory_stats.sys, 32.0);
        assert_eq!(snapshot.runtime_memory_stats.heap_inuse, 8.0);
        assert_eq!(snapshot.ps_entries.len(), 3);
    }

    #[test]
    fn test_collect_resolves_owners() {
        let snapshot = collector(MockFs::typical_system()).collect(id()).unwrap();

        let nginx = snapshot.ps_entries.iter().find(|p| p.pid == 1001).unwrap();
        assert_eq!(nginx.user, "www-data");
        assert_eq!(nginx.name, "nginx");
    }

    #[test]
    fn test_collect_without_passwd() {
        let fs = MockFs::typical_system();
        let collector = Collector::with_passwd(fs, "/proc", "/missing/passwd", FixedProbe::default())
            .with_sample_window(Duration::ZERO);

        let snapshot = collector.collect(id()).unwrap();
        let bash = snapshot.ps_entries.iter().find(|p| p.pid == 1000).unwrap();
        assert_eq!(bash.user, "1000");
    }

    #[test]
    fn test_collect_with_empty_passwd() {
        let mut fs = MockFs::typical_system();
        fs.add_file("/etc/passwd", "# no users\n");
        let collector = Collector::new(fs, "/proc", FixedProbe::default())
            .with_sample_window(Duration::ZERO);

        let snapshot = collector.collect(id()).unwrap();
        let nginx = snapshot.ps_entries.iter().find(|p| p.pid == 1001).unwrap();
        assert_eq!(nginx.user, "33");
    }

    #[test]
    fn test_collect_special_names() {
        let snapshot = collector(MockFs::with_special_names()).collect(id()).unwrap();
        assert_eq!(snapshot.ps_entries.len(), 6);

        let web = snapshot.ps_entries.iter().find(|p| p.pid == 5000).unwrap();
        assert_eq!(web.name, "Web Content");
        let tmux = snapshot.ps_entries.iter().find(|p| p.pid == 5001).unwrap();
        assert_eq!(tmux.name, "tmux: server (1)");
        let kthread = snapshot.ps_entries.iter().find(|p| p.pid == 2).unwrap();
        assert_eq!(kthread.vm_rss, 0);
        assert_eq!(kthread.user, "root");
    }

    #[test]
    fn test_missing_meminfo_keeps_zero_totals() {
        let mut fs = MockFs::typical_system();
        fs.remove_file("/proc/meminfo");

        let snapshot = collector(fs).collect(id()).unwrap();
        assert_eq!(snapshot.totals(), MemTotals::default());
        assert_eq!(snapshot.ps_entries.len(), 3);
    }

    #[test]
    fn test_vanished_process_degrades_snapshot() {
        let mut fs = MockFs::typical_system();
        fs.remove_file("/proc/1000/status");

        let err = collector(fs).collect(id()).unwrap_err();
        assert!(matches!(err.source, CollectError::ProcessGone(1000)));
        assert_eq!(err.snapshot.total, 16384000);
        assert_eq!(err.snapshot.runtime_memory_stats.alloc, 4.0);
        assert!(err.snapshot.ps_entries.is_empty());
    }

    #[test]
    fn test_sample_window_override() {
        let collector = collector(MockFs::typical_system());
        assert_eq!(collector.process_sampler().window(), Duration::ZERO);

        let default = Collector::new(MockFs::new(), "/proc", FixedProbe::default());
        assert_eq!(
            default.process_sampler().window(),
            crate::collector::procfs::DEFAULT_SAMPLE_WINDOW
        );
    }

    #[test]
    fn test_collect_timed_reports_phases() {
        let (result, timing) = collector(MockFs::typical_system()).collect_timed(id());
        assert!(result.is_ok());
        assert!(timing.total >= timing.processes);
    }
}
