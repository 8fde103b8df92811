//! # Validation Error Types
//!
//! Input validation failures surfaced before any local write happens.
//! A validation failure blocks the mutation entirely; there is no partial
//! write to roll back.
//!
//! ## Error Flow
//! ```text
//! ValidationError (here) → ServiceError (cantina-domain) → UI messaging
//! ```

use thiserror::Error;

/// Input validation errors.
///
/// Used for early validation before domain logic runs. Each variant carries
/// the offending field so the UI can highlight the right input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., a calendar date that is not `YYYY-MM-DD`).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: 9999,
        };
        assert_eq!(err.to_string(), "stock must be between 0 and 9999");

        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }
}
