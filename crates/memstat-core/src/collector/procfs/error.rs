use super::parser::ParseError;

/// Error type for collection failures.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// Process disappeared during collection.
    #[error("process {0} disappeared")]
    ProcessGone(u32),
    /// I/O error reading procfs files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Parse error in procfs files.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::Parse(e.message)
    }
}
