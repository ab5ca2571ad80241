//! CLI-specific error types
//!
//! All CLI errors are fatal: the error envelope is printed and the process
//! exits non-zero.

use std::fmt;
use std::io;

use crate::compiler::CompileError;
use crate::config::ConfigError;
use crate::descriptor::DescriptorError;
use crate::dialect::DialectError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// stdin/stdout failure
    IoError,
    /// Malformed schema file
    SchemaError,
    /// Envelope on stdin does not fit the schema
    InputError,
    /// Error raised by the library, carrying its own code
    Library(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::IoError => "SIFT_CLI_IO_ERROR",
            Self::SchemaError => "SIFT_CLI_SCHEMA_ERROR",
            Self::InputError => "SIFT_CLI_INPUT_ERROR",
            Self::Library(code) => code,
        }
    }
}

/// CLI error with code and message
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Create a schema error
    pub fn schema_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::SchemaError, msg)
    }

    /// Create an input error
    pub fn input_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InputError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::input_error(format!("JSON error: {}", e))
    }
}

macro_rules! library_error {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CliError {
                fn from(e: $ty) -> Self {
                    Self::new(CliErrorCode::Library(e.code()), e.to_string())
                }
            }
        )*
    };
}

library_error!(ConfigError, DescriptorError, CompileError, DialectError);

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_codes_pass_through() {
        let err = CliError::from(DialectError::Unsupported("db2".into()));
        assert_eq!(err.code_str(), "SIFT_DIALECT_UNSUPPORTED");
        assert!(err.message().contains("db2"));
    }

    #[test]
    fn test_display() {
        let err = CliError::schema_error("missing source");
        assert_eq!(err.to_string(), "SIFT_CLI_SCHEMA_ERROR: missing source");
    }
}
