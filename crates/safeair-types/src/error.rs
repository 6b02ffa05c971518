//! Error types for safeair-types.

use thiserror::Error;

/// Errors raised while validating or parsing dashboard values.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A required field was empty.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// The owner email address is malformed.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// A coordinate was outside its valid range.
    #[error("{field} {value} is out of range ({min} to {max})")]
    CoordinateOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Unknown owner type.
    #[error("Unknown owner type '{0}'. Valid values: COMPANY, INDIVIDUAL, GOVERNMENT, NON_PROFIT")]
    UnknownOwnerType(String),

    /// A date string could not be parsed.
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Result type alias using [`ValidationError`].
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
