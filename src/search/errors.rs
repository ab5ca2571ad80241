//! Search error types
//!
//! Error codes:
//! - SIFT_DESCRIPTOR_INVALID, SIFT_UNSUPPORTED_KIND, SIFT_DIALECT_UNSUPPORTED,
//!   SIFT_CURSOR_INVALID, SIFT_MATERIALIZE_FAILED, SIFT_CONFIG_INVALID:
//!   delegated to the wrapped error
//! - SIFT_EXECUTION_FAILED: the executor failed the page query
//! - SIFT_COUNT_FAILED: the executor failed the count query (recovered)

use thiserror::Error;

use super::executor::ExecutorError;
use crate::compiler::CompileError;
use crate::config::ConfigError;
use crate::descriptor::DescriptorError;
use crate::dialect::DialectError;
use crate::materialize::MaterializeError;

/// Result type for search calls
pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Dialect(#[from] DialectError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Executor error, passed through unchanged
    #[error("Execution failed: {0}")]
    Execution(#[source] ExecutorError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

impl SearchError {
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::Descriptor(err) => err.code(),
            SearchError::Compile(err) => err.code(),
            SearchError::Dialect(err) => err.code(),
            SearchError::Config(err) => err.code(),
            SearchError::Execution(_) => "SIFT_EXECUTION_FAILED",
            SearchError::Materialize(err) => err.code(),
        }
    }

    /// Every error that reaches the caller has aborted the search.
    pub fn is_fatal(&self) -> bool {
        true
    }
}

/// A failed count query. Logged and replaced by a total of 0.
#[derive(Debug, Error)]
#[error("Count query failed: {source}")]
pub struct CountError {
    #[source]
    pub source: ExecutorError,
}

impl CountError {
    pub fn code(&self) -> &'static str {
        "SIFT_COUNT_FAILED"
    }

    pub fn is_fatal(&self) -> bool {
        false
    }
}
