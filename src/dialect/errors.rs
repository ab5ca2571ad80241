//! Dialect error types

use thiserror::Error;

use crate::paging::PagingError;

/// Result type for rendering
pub type DialectResult<T> = Result<T, DialectError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialectError {
    /// No renderer for the requested backend and no fallback allowed
    #[error("Unsupported dialect: {0}")]
    Unsupported(String),

    /// The backend cannot express an operator the query needs
    #[error("{dialect} cannot render {operator}")]
    UnsupportedOperator {
        dialect: &'static str,
        operator: &'static str,
    },

    #[error(transparent)]
    Paging(#[from] PagingError),
}

impl DialectError {
    pub fn code(&self) -> &'static str {
        match self {
            DialectError::Unsupported(_) | DialectError::UnsupportedOperator { .. } => {
                "SIFT_DIALECT_UNSUPPORTED"
            }
            DialectError::Paging(err) => err.code(),
        }
    }

    /// Rendering errors abort the call before anything executes.
    pub fn is_fatal(&self) -> bool {
        true
    }
}
