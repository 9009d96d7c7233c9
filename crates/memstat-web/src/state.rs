//! Shared application state and the global allocator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use axum::extract::State;

use memstat_core::collector::{AllocatorProbe, Collector, Degraded, FileSystem};
use memstat_core::model::{InstanceId, MemorySnapshot};

/// Anything that can build one snapshot per request.
pub(crate) trait MemorySource: Send + Sync {
    fn collect(&self, id: InstanceId) -> Result<MemorySnapshot, Degraded>;
}

impl<F, A> MemorySource for Collector<F, A>
where
    F: FileSystem + Clone,
    A: AllocatorProbe,
{
    fn collect(&self, id: InstanceId) -> Result<MemorySnapshot, Degraded> {
        Collector::collect(self, id)
    }
}

pub(crate) struct WebAppInner {
    pub(crate) source: Box<dyn MemorySource>,
    // Generated once at startup, reported in every snapshot.
    pub(crate) instance_id: InstanceId,
}

impl WebAppInner {
    pub(crate) fn new(source: Box<dyn MemorySource>, instance_id: InstanceId) -> Self {
        Self {
            source,
            instance_id,
        }
    }
}

pub(crate) type SharedState = Arc<WebAppInner>;

pub(crate) type AppState = State<SharedState>;
