//! Host memory collector for Linux.
//!
//! This module reads system and process metrics from the Linux `/proc`
//! filesystem, with support for mocking for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Collector                          │
//! │  ┌──────────────────┐ ┌────────────────┐ ┌──────────────┐  │
//! │  │ SystemCollector  │ │ ProcessSampler │ │AllocatorProbe│  │
//! │  │ - /proc/meminfo  │ │ - /proc/[pid]/ │ │ - jemalloc   │  │
//! │  └────────┬─────────┘ └───────┬────────┘ └──────────────┘  │
//! │           └──────────┬────────┘                            │
//! │               ┌──────▼──────┐                              │
//! │               │  FileSystem │ (trait)                      │
//! │               └──────┬──────┘                              │
//! └──────────────────────┼─────────────────────────────────────┘
//!              ┌─────────┴─────────┐
//!       ┌──────▼──────┐     ┌──────▼──────┐
//!       │   RealFs    │     │   MockFs    │
//!       │  (Linux)    │     │  (Testing)  │
//!       └─────────────┘     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use memstat_core::collector::{Collector, JemallocProbe, RealFs};
//! use memstat_core::model::InstanceId;
//!
//! let collector = Collector::new(RealFs::new(), "/proc", JemallocProbe::new());
//! let snapshot = collector.collect(InstanceId::generate());
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use std::time::Duration;
//! use memstat_core::collector::{Collector, FixedProbe, MockFs};
//! use memstat_core::model::InstanceId;
//!
//! let fs = MockFs::typical_system();
//! let collector = Collector::new(fs, "/proc", FixedProbe::default())
//!     .with_sample_window(Duration::ZERO);
//! let snapshot = collector.collect(InstanceId::generate()).unwrap();
//! assert_eq!(snapshot.ps_entries.len(), 3);
//! ```

pub mod allocator;
#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use allocator::{AllocatorProbe, FixedProbe, JemallocProbe};
pub use collector::{Collector, CollectorTiming, Degraded};
pub use mock::MockFs;
pub use procfs::{CollectError, ParseError, UserResolver};
pub use traits::{FileSystem, RealFs};
