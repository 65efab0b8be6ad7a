//! Error types for the PHI-base pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PhiError>;

/// Main error type for the pipeline
///
/// Every variant is fatal: a partially cleaned table is never released.
#[derive(Error, Debug)]
pub enum PhiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid rule table: {0}")]
    Rules(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A header no longer maps onto an identifier-like key
    #[error("Column name '{column}' does not match the expected schema")]
    SchemaDrift { column: String },

    /// Values that do not match their column grammar, each listed once
    #[error("column {column} has invalid values:\n{}", .values.join("\n"))]
    InvalidValues { column: String, values: Vec<String> },

    #[error("column {column} has a non-integer value: {value}")]
    InvalidInteger { column: String, value: String },

    #[error("Unrecognized curation date: {0}")]
    InvalidDate(String),

    #[error("No original header recorded for column '{0}'")]
    MissingHeaderMapping(String),

    #[error("Column '{column}' has {actual} values, expected {expected}")]
    RowLength {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl PhiError {
    /// Create a rule table error
    pub fn rules(msg: impl Into<String>) -> Self {
        Self::Rules(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
