//! System collector for global memory counters from `/proc/meminfo`.

use std::path::Path;

use crate::collector::procfs::error::CollectError;
use crate::collector::procfs::parser::parse_meminfo;
use crate::collector::traits::FileSystem;
use crate::model::MemTotals;

/// Collects system-wide metrics from `/proc/`.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Reads MemTotal, MemFree and MemAvailable from `/proc/meminfo`.
    ///
    /// Lines with other keys are ignored. An unreadable file is an
    /// `Io` error, a malformed line a `Parse` error.
    pub fn read_memory_stats(&self) -> Result<MemTotals, CollectError> {
        let path = format!("{}/meminfo", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        Ok(parse_meminfo(&content)?)
    }
}
