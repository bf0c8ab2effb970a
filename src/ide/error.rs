use thiserror::Error;

use crate::hir::Cancelled;

/// Errors from decoder queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no schema has been set")]
    NoSchema,

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<Cancelled> for DecodeError {
    fn from(_: Cancelled) -> Self {
        DecodeError::Cancelled
    }
}
