use serde::{Deserialize, Serialize};

use super::{InstanceId, ProcessSample};

/// System-wide memory counters from `/proc/meminfo`, in KiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemTotals {
    /// MemTotal.
    pub total: u64,
    /// MemFree.
    pub free: u64,
    /// MemAvailable.
    pub available: u64,
}

/// Allocator counters of this process (jemalloc), converted to KiB.
///
/// Keys follow the runtime memory stats layout where jemalloc has a
/// matching counter. `totalAlloc`, `lookups`, `mallocs`, `frees`,
/// `heapObjects`, `stackInuse`, `stackSys`, `mSpanInuse` and `mSpanSys` have
/// no jemalloc counterpart and are not reported.
///
/// Every field is zero when the allocator does not expose statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AllocatorStats {
    /// Bytes allocated by the application (`stats.allocated`).
    pub alloc: f64,
    /// Bytes obtained from the OS: `stats.mapped` plus `stats.retained`.
    pub sys: f64,
    /// Same as `alloc`.
    pub heap_alloc: f64,
    /// Physically resident data pages (`stats.resident`).
    pub heap_sys: f64,
    /// Resident pages not in active use (`heapSys - heapInuse`).
    pub heap_idle: f64,
    /// Pages in active extents (`stats.active`).
    pub heap_inuse: f64,
    /// Virtual memory retained but not backed (`stats.retained`).
    pub heap_released: f64,
    /// Bytes dedicated to allocator metadata (`stats.metadata`).
    pub metadata: f64,
}

impl AllocatorStats {
    /// Builds stats from raw jemalloc byte counters.
    pub fn from_bytes(
        allocated: usize,
        active: usize,
        metadata: usize,
        resident: usize,
        mapped: usize,
        retained: usize,
    ) -> Self {
        let kib = |bytes: usize| bytes as f64 / 1024.0;
        Self {
            alloc: kib(allocated),
            sys: kib(mapped.saturating_add(retained)),
            heap_alloc: kib(allocated),
            heap_sys: kib(resident),
            heap_idle: kib(resident.saturating_sub(active)),
            heap_inuse: kib(active),
            heap_released: kib(retained),
            metadata: kib(metadata),
        }
    }
}

/// Top-level response object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    /// Identifier of the running service instance.
    #[cfg_attr(feature = "api", schema(value_type = String, example = "1a2b3c4d"))]
    pub id: InstanceId,
    /// MemTotal, KiB.
    pub total: u64,
    /// MemFree, KiB.
    pub free: u64,
    /// MemAvailable, KiB.
    pub available: u64,
    pub runtime_memory_stats: AllocatorStats,
    /// One entry per process. Always present, possibly empty.
    pub ps_entries: Vec<ProcessSample>,
}

impl MemorySnapshot {
    /// Creates a snapshot without process entries.
    pub fn new(id: InstanceId, totals: MemTotals, runtime_memory_stats: AllocatorStats) -> Self {
        Self {
            id,
            total: totals.total,
            free: totals.free,
            available: totals.available,
            runtime_memory_stats,
            ps_entries: Vec::new(),
        }
    }

    /// Memory counters of this snapshot.
    pub fn totals(&self) -> MemTotals {
        MemTotals {
            total: self.total,
            free: self.free,
            available: self.available,
        }
    }
}
