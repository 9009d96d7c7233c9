use serde::{Deserialize, Serialize};

/// Per-process entry of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProcessSample {
    pub pid: u32,
    /// Owner of the process (real UID resolved through `/etc/passwd`).
    pub user: String,
    /// Resident set size, KiB.
    pub vm_rss: u64,
    /// Virtual memory size, KiB.
    pub vm_size: u64,
    pub name: String,
    /// CPU usage over the sampling window, percent of one CPU.
    pub cpu_usage: f64,
}
