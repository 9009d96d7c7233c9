//! memstat-core: host memory and process statistics from `/proc`.
//!
//! Provides:
//! - `collector`: procfs readers, the process CPU sampler, allocator probe
//!   and the `Collector` that merges them into one snapshot
//! - `model`: the serializable snapshot types
//! - `util`: platform helpers (clock ticks)
//!
//! With `api` feature:
//! - `utoipa::ToSchema` derives for the model types

pub mod collector;
pub mod model;
pub mod util;

/// Crate version, reported by the web binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
