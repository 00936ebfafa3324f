//! Error types for fluent-cql.

use thiserror::Error;

/// The main error type for fluent-cql operations.
#[derive(Debug, Error)]
pub enum CqlError {
    /// A node, operator, or right-hand value falls outside the supported grammar.
    ///
    /// This is the only error the compilers produce. It is deterministic in
    /// its input, so retrying the same compile call cannot succeed.
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// A record was asked for a column it does not hold.
    #[error("Column, {column}, could not be found in '{family}'")]
    ColumnNotFound { family: String, column: String },

    /// Failed to parse predicate text.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CqlError {
    /// Create an unsupported-expression error.
    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::UnsupportedExpression(detail.into())
    }

    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// True for errors raised by the compilers rather than by the caller-side layers.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedExpression(_))
    }
}

/// Result type alias for fluent-cql operations.
pub type CqlResult<T> = Result<T, CqlError>;
