//! Validation error type

use thiserror::Error;

/// A payload field failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is missing")]
    Missing { field: &'static str },

    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("{field} should be {expected}")]
    WrongType { field: &'static str, expected: &'static str },
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } | Self::Invalid { field, .. } | Self::WrongType { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_field() {
        let err = ValidationError::invalid("email", "missing '@'");
        assert_eq!(err.to_string(), "email is invalid: missing '@'");
        assert_eq!(err.field(), "email");

        let err = ValidationError::WrongType {
            field: "origin_location",
            expected: "an array",
        };
        assert_eq!(err.to_string(), "origin_location should be an array");
    }
}
