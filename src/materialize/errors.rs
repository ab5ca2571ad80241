//! Materialization error types

use thiserror::Error;

use crate::filter::ValueTypeError;

/// Result type for materialization
pub type MaterializeResult<T> = Result<T, MaterializeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaterializeError {
    /// A column value could not be stored into its field
    #[error("Failed to materialize {type_name}.{field} from column '{column}': {source}")]
    Field {
        type_name: String,
        field: String,
        column: String,
        #[source]
        source: ValueTypeError,
    },

    /// The windowed total column held something other than a count
    #[error("Invalid total column: {0}")]
    Total(ValueTypeError),
}

impl MaterializeError {
    pub fn code(&self) -> &'static str {
        "SIFT_MATERIALIZE_FAILED"
    }

    pub fn is_fatal(&self) -> bool {
        true
    }
}
