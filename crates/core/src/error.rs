//! Input error model.

use thiserror::Error;

/// Result type used when reading and validating input tables.
pub type DomainResult<T> = Result<T, DomainError>;

/// Input-level error.
///
/// Every variant is fatal to an analysis run: malformed input aborts before
/// any output is written. Numeric edge cases (zero denominators, single
/// observations) are not errors and never surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. empty identifier).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A required column is absent from a table header.
    #[error("{table}: missing required column `{column}`")]
    MissingColumn { table: String, column: String },

    /// A date cell could not be parsed.
    #[error("{table}: line {line}: invalid date `{value}`")]
    InvalidDate {
        table: String,
        line: u64,
        value: String,
    },

    /// A numeric cell could not be parsed.
    #[error("{table}: line {line}: column `{column}` is not numeric (`{value}`)")]
    InvalidNumber {
        table: String,
        line: u64,
        column: String,
        value: String,
    },

    /// The same identifier appears on more than one item master row.
    #[error("duplicate inventory id `{0}`")]
    DuplicateId(String),

    /// The input could not be read or is not well-formed CSV.
    #[error("malformed input: {0}")]
    Malformed(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}
