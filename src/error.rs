use std::path::PathBuf;

/// Errors raised while loading the dataset or computing aggregates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backing file is missing, unreadable, or lacks a required column.
    #[error("failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// A date or numeric field could not be parsed. `line` is 1-based and counts the header.
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    /// The caller asked for a column that does not exist or a non-positive top-N count.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
