//! Error types for cache-geometry analysis

use thiserror::Error;

/// Errors raised by the analytical core and the table parser
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Input violates a precondition (window too large for the series, bad config value)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Row lookup found no row with the requested key
    #[error("No row with key {key}")]
    NotFound { key: String },

    /// Delimited-text table could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
