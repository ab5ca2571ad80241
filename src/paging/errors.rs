//! Paging error types

use thiserror::Error;

/// Result type for paging operations
pub type PagingResult<T> = Result<T, PagingError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PagingError {
    /// Continuation token could not be decoded
    #[error("Invalid page token '{token}': {reason}")]
    InvalidCursor { token: String, reason: String },
}

impl PagingError {
    pub fn code(&self) -> &'static str {
        match self {
            PagingError::InvalidCursor { .. } => "SIFT_CURSOR_INVALID",
        }
    }

    pub fn is_fatal(&self) -> bool {
        true
    }
}
