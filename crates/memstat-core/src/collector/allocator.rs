//! Allocator statistics of the running process.
//!
//! Production builds link jemalloc as the global allocator; its counters are
//! read through `mallctl`. On targets without jemalloc every counter is zero.

use crate::model::AllocatorStats;

/// Source of allocator counters.
pub trait AllocatorProbe: Send + Sync {
    /// Reads a fresh set of counters.
    fn read(&self) -> AllocatorStats;
}

/// Probe backed by jemalloc's `stats.*` mallctl namespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct JemallocProbe;

impl JemallocProbe {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_env = "msvc"))]
mod jemalloc {
    use std::ffi::CStr;
    use std::mem::size_of;
    use std::ptr;

    /// Advances the stats epoch so subsequent reads see current values.
    pub(super) fn refresh_epoch() -> bool {
        let mut epoch: u64 = 1;
        // SAFETY: "epoch" takes a u64 written through newp; the length matches.
        let rc = unsafe {
            tikv_jemalloc_sys::mallctl(
                c"epoch".as_ptr().cast(),
                ptr::null_mut(),
                ptr::null_mut(),
                (&mut epoch as *mut u64).cast(),
                size_of::<u64>(),
            )
        };
        rc == 0
    }

    /// Reads one `size_t` statistic, `None` if jemalloc rejects the name.
    pub(super) fn read_size(name: &CStr) -> Option<usize> {
        let mut value: usize = 0;
        let mut len = size_of::<usize>();
        // SAFETY: every stats.* key read here is a size_t; oldp/oldlenp point
        // to a properly sized local.
        let rc = unsafe {
            tikv_jemalloc_sys::mallctl(
                name.as_ptr().cast(),
                (&mut value as *mut usize).cast(),
                &mut len,
                ptr::null_mut(),
                0,
            )
        };
        (rc == 0 && len == size_of::<usize>()).then_some(value)
    }
}

#[cfg(not(target_env = "msvc"))]
impl AllocatorProbe for JemallocProbe {
    fn read(&self) -> AllocatorStats {
        if !jemalloc::refresh_epoch() {
            tracing::warn!("jemalloc epoch refresh failed, allocator stats may be stale");
        }
        let read = |name: &std::ffi::CStr| jemalloc::read_size(name).unwrap_or(0);
        AllocatorStats::from_bytes(
            read(c"stats.allocated"),
            read(c"stats.active"),
            read(c"stats.metadata"),
            read(c"stats.resident"),
            read(c"stats.mapped"),
            read(c"stats.retained"),
        )
    }
}

#[cfg(target_env = "msvc")]
impl AllocatorProbe for JemallocProbe {
    fn read(&self) -> AllocatorStats {
        AllocatorStats::default()
    }
}

/// Probe returning fixed counters, for tests and platforms without jemalloc.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedProbe(pub AllocatorStats);

impl AllocatorProbe for FixedProbe {
    fn read(&self) -> AllocatorStats {
        self.0
    }
}
