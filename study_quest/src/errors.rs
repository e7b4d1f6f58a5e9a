//! Model parsing error types.

use thiserror::Error;

/// Errors raised when turning user input into model values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Unknown ranking period
    #[error("Invalid ranking period '{0}': expected week, month or all")]
    InvalidPeriod(String),

    /// Date not in YYYY-MM-DD form
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Result type for model parsing
pub type ModelResult<T> = Result<T, ModelError>;
