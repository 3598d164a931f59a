//! Error types for filigree-stats
//!
//! Covers the two ways a statistics call can fail before any arithmetic
//! runs: a metric built with out-of-range parameters, and a table lookup
//! that does not match the table's schema.

use thiserror::Error;

/// Errors raised by metric construction and table access
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Metric parameters violate the metric's constraints
    #[error("Invalid {metric} parameters: {reason}")]
    InvalidMetric { metric: &'static str, reason: String },

    /// A summarizer or smoother parameter is out of range
    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Quantile level outside the open interval (0, 1)
    #[error("Quantile level {level} must lie strictly between 0 and 1")]
    InvalidQuantileLevel { level: f64 },

    /// Column not present in the table
    #[error("Column '{column}' not found in table")]
    ColumnNotFound { column: String },

    /// Column has the wrong kind for the requested operation
    #[error("Type mismatch for column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Column length differs from the table's row count
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two columns share a name
    #[error("Duplicate column name '{column}'")]
    DuplicateColumn { column: String },

    /// Input slices that must be aligned have different lengths
    #[error("Mismatched input lengths: x has {x_len} values, y has {y_len}")]
    MismatchedInputs { x_len: usize, y_len: usize },
}

/// Result type alias for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_metric_display() {
        let err = StatsError::InvalidMetric {
            metric: "Quantile",
            reason: "q must lie in (0, 1), got 1.5".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Quantile"));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = StatsError::TypeMismatch {
            column: "score".to_string(),
            expected: "int or text",
            actual: "float",
        };
        assert!(err.to_string().contains("score"));
        assert!(err.to_string().contains("float"));
    }
}
