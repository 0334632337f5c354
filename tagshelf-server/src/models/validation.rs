//! Validation error types

use thiserror::Error;

/// Validation error for catalog input
///
/// Raised before any store call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required field is empty (after trimming)
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Field exceeds maximum length in characters
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Value doesn't match the required format
    #[error("{field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Numeric value could not be parsed or is out of range
    #[error("invalid {field} value: '{value}'")]
    Malformed { field: &'static str, value: String },
}

/// Count characters the way the store's `length()` does.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Validate a required text field: trimmed, non-empty, bounded.
pub(crate) fn required_text(
    field: &'static str,
    s: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if char_len(trimmed) > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Validate an optional text field.
///
/// Empty (or whitespace-only) input becomes `None` so the store records
/// the field as absent rather than as an empty string.
pub(crate) fn optional_text(
    field: &'static str,
    s: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = s.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if char_len(trimmed) > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(Some(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "name",
            max: 512,
        };
        assert_eq!(
            err.to_string(),
            "name exceeds maximum length of 512 characters"
        );
    }

    #[test]
    fn optional_empty_is_absent() {
        assert_eq!(optional_text("url", Some(""), 10).unwrap(), None);
        assert_eq!(optional_text("url", Some("   "), 10).unwrap(), None);
        assert_eq!(optional_text("url", None, 10).unwrap(), None);
        assert_eq!(
            optional_text("url", Some(" a.b "), 10).unwrap().as_deref(),
            Some("a.b")
        );
    }

    #[test]
    fn lengths_count_characters() {
        // 4 characters, 7 bytes
        assert!(required_text("name", "ñañá", 4).is_ok());
        assert!(matches!(
            required_text("name", "ñañáx", 4),
            Err(ValidationError::TooLong { max: 4, .. })
        ));
    }
}
