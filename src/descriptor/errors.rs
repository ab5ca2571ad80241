//! Descriptor error types
//!
//! Every variant maps to `SIFT_DESCRIPTOR_INVALID` and is fatal. A failed
//! build is cached for the type, so the same error is returned on every
//! later resolution.

use thiserror::Error;

/// Result type for descriptor resolution
pub type DescriptorResult<T> = Result<T, DescriptorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Two annotations of the same kind disagree
    #[error("{type_name}.{field}: conflicting {attribute} annotations '{first}' and '{second}'")]
    Conflicting {
        type_name: String,
        field: String,
        attribute: &'static str,
        first: String,
        second: String,
    },

    /// Annotation does not apply to the field's declared type
    #[error("{type_name}.{field}: '{attribute}' is not valid on a {field_type} field")]
    Incompatible {
        type_name: String,
        field: String,
        attribute: String,
        field_type: &'static str,
    },

    /// Tag key not recognised
    #[error("{type_name}.{field}: unknown annotation '{key}'")]
    UnknownTag {
        type_name: String,
        field: String,
        key: String,
    },

    /// Tag recognised but its value is not
    #[error("{type_name}.{field}: malformed annotation '{tag}': {reason}")]
    MalformedTag {
        type_name: String,
        field: String,
        tag: String,
        reason: String,
    },

    #[error("{type_name}: field name '{field}' declared twice")]
    DuplicateField { type_name: String, field: String },

    #[error("{type_name}: more than one primary key ('{first}' and '{second}')")]
    ConflictingPrimaryKey {
        type_name: String,
        first: String,
        second: String,
    },

    #[error("{type_name}: no primary key field")]
    MissingPrimaryKey { type_name: String },
}

impl DescriptorError {
    pub fn code(&self) -> &'static str {
        "SIFT_DESCRIPTOR_INVALID"
    }

    pub fn is_fatal(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_location() {
        let err = DescriptorError::Conflicting {
            type_name: "UserFilter".into(),
            field: "name".into(),
            attribute: "column",
            first: "user_name".into(),
            second: "username".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("UserFilter.name"));
        assert!(msg.contains("user_name"));
        assert_eq!(err.code(), "SIFT_DESCRIPTOR_INVALID");
        assert!(err.is_fatal());
    }
}
