//! Error types for filigree-core
//!
//! Provides error handling for:
//! - Statistics failures bubbled up from filigree-stats
//! - Layout failures (bad widths, bins, too few quantiles)
//! - Configuration validation
//! - Serialization of layout output

use filigree_stats::StatsError;
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for filigree operations
#[derive(Error, Debug)]
pub enum FiligreeError {
    /// Metric, table or summarizer errors
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Layout errors
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization errors
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while turning statistics into coordinates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Quantile histograms need at least three cut levels
    #[error("Need more than {min} quantile levels, got {count}")]
    TooFewQuantiles { count: usize, min: usize },

    /// Widths scale glyphs and must be positive
    #[error("Invalid width {width}: must be finite and positive")]
    InvalidWidth { width: f64 },

    /// Bin edges or counts are unusable
    #[error("Invalid bins: {message}")]
    InvalidBins { message: String },

    /// Nothing to lay out
    #[error("No data to lay out: {what}")]
    EmptyInput { what: &'static str },

    /// A caller-supplied center map lacks a group
    #[error("No center position for group '{group}'")]
    MissingCenter { group: String },

    /// Paired inputs differ in length
    #[error("Mismatched input lengths: x has {x_len} values, y has {y_len}")]
    MismatchedInputs { x_len: usize, y_len: usize },

    /// Palette cannot map a 0-1 scale
    #[error("Palette needs at least 2 colors, got {size}")]
    PaletteTooSmall { size: usize },
}

/// Result type alias for filigree operations
pub type FiligreeResult<T> = Result<T, FiligreeError>;

/// Result type alias for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Validation utilities
pub mod validation {
    use super::*;

    /// Validate a glyph width
    pub fn validate_width(width: f64) -> LayoutResult<()> {
        if !(width.is_finite() && width > 0.0) {
            return Err(LayoutError::InvalidWidth { width });
        }
        Ok(())
    }

    /// Validate the number of quantile levels for a quantile histogram
    pub fn validate_quantile_count(count: usize) -> LayoutResult<()> {
        const MIN_LEVELS: usize = 2;

        if count <= MIN_LEVELS {
            return Err(LayoutError::TooFewQuantiles {
                count,
                min: MIN_LEVELS,
            });
        }
        Ok(())
    }

    /// Validate that two paired inputs align
    pub fn validate_paired(x_len: usize, y_len: usize) -> LayoutResult<()> {
        if x_len != y_len {
            return Err(LayoutError::MismatchedInputs { x_len, y_len });
        }
        Ok(())
    }
}
