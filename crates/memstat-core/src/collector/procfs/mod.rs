//! Collectors for the Linux `/proc` filesystem.
//!
//! This module provides parsers and collectors for reading system memory and
//! process information from the `/proc` virtual filesystem.

mod error;
pub mod parser;
pub mod process;
pub mod system;

pub use error::CollectError;
pub use parser::{ParseError, UserResolver};
pub use process::{DEFAULT_SAMPLE_WINDOW, PendingSample, ProcessSampler, enumerate_pids};
pub use system::SystemCollector;
