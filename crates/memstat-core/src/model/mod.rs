//! Data model for one point-in-time memory snapshot.
//!
//! All types are plain values built once per request and serialized with
//! camelCase keys.

mod instance;
mod process;
mod snapshot;

pub use instance::InstanceId;
pub use process::ProcessSample;
pub use snapshot::{AllocatorStats, MemTotals, MemorySnapshot};
