//! Error types for habit-strength

use thiserror::Error;

/// Errors that can occur during score or calendar computation
#[derive(Debug, Error)]
pub enum StrengthError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid frequency: {0} (expected a value in the open interval (0, 14))")]
    InvalidFrequency(f64),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Timestamp out of calendar range: {0}")]
    InvalidTimestamp(i64),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
