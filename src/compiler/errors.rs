//! Compile error types
//!
//! Error codes:
//! - SIFT_UNSUPPORTED_KIND: a field value has a shape its kind cannot compile
//! - SIFT_DESCRIPTOR_INVALID: a filter reported a different number of values
//!   than it declares fields

use thiserror::Error;

use crate::descriptor::SemanticKind;

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Value does not match the field's semantic kind
    #[error("{type_name}.{field}: a {shape} value cannot be compiled as '{kind}'")]
    UnsupportedSemanticKind {
        type_name: String,
        field: String,
        kind: SemanticKind,
        shape: &'static str,
    },

    /// `values()` disagrees with `field_defs()`
    #[error("{type_name}: filter reported {actual} values for {expected} declared fields")]
    FieldCountMismatch {
        type_name: String,
        expected: usize,
        actual: usize,
    },
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::UnsupportedSemanticKind { .. } => "SIFT_UNSUPPORTED_KIND",
            CompileError::FieldCountMismatch { .. } => "SIFT_DESCRIPTOR_INVALID",
        }
    }

    /// Compilation errors abort the call before anything executes.
    pub fn is_fatal(&self) -> bool {
        true
    }
}
