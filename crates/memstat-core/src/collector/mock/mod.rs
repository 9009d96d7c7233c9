//! Mock filesystem for testing collectors without a real `/proc`.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
pub use scenarios::{stat_line, status_text};
