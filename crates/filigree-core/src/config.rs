//! Configuration for filigree-core
//!
//! One section per chart family. Every section has defaults matching the
//! conventional chart (1.5 IQR fences, 0.8 glyph width, 256-color
//! palette), so callers only override what they need.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::qhist::HeightTransform;

/// Layout-wide configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(default)]
pub struct FiligreeConfig {
    /// Box-and-whisker settings
    pub box_plot: BoxPlotConfig,
    /// Quantile histogram settings
    pub quantile_histogram: QuantileHistogramConfig,
    /// 2D density settings
    pub density: DensityConfig,
    /// Scatter matrix settings
    pub scatter: ScatterMatrixConfig,
}

/// Box-and-whisker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(default)]
pub struct BoxPlotConfig {
    /// Fence distance from the quartiles, in IQRs
    pub outlier_r: f64,
    /// Box width in axis units
    pub width: f64,
    /// Spread outlier points horizontally
    pub jitter: bool,
    /// Seed for the jitter generator
    pub jitter_seed: u64,
}

impl Default for BoxPlotConfig {
    fn default() -> Self {
        Self {
            outlier_r: 1.5,
            width: 0.8,
            jitter: true,
            jitter_seed: 42,
        }
    }
}

/// Quantile histogram configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(default)]
pub struct QuantileHistogramConfig {
    /// Bin edges as quantile levels in (0, 1)
    pub quantiles: Vec<f64>,
    /// Mirror bins around the group center
    pub centered: bool,
    /// Height from quantile mass instead of density
    pub absolute: bool,
    /// Height of the tallest bin in axis units
    pub width: f64,
    /// Transform applied to bin heights before normalization
    pub transform: HeightTransform,
}

/// 0.25, 0.30, ..., 0.75
pub fn default_histogram_quantiles() -> Vec<f64> {
    (5..=15).map(|i| i as f64 * 0.05).collect()
}

impl Default for QuantileHistogramConfig {
    fn default() -> Self {
        Self {
            quantiles: default_histogram_quantiles(),
            centered: true,
            absolute: false,
            width: 0.8,
            transform: HeightTransform::Identity,
        }
    }
}

/// 2D density configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(default)]
pub struct DensityConfig {
    /// Draw the most common color level as one background rectangle
    pub group_largest: bool,
    /// Number of palette entries density is quantized into
    pub palette_size: u32,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            group_largest: false,
            palette_size: 256,
        }
    }
}

/// Scatter matrix configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(default)]
pub struct ScatterMatrixConfig {
    /// Fill the upper triangle too
    pub full: bool,
    /// Seed for generated column colors
    pub color_seed: u64,
}

impl Default for ScatterMatrixConfig {
    fn default() -> Self {
        Self {
            full: false,
            color_seed: 7,
        }
    }
}

impl FiligreeConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    #[cfg(feature = "toml-config")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    #[cfg(feature = "toml-config")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.box_plot.validate()?;
        self.quantile_histogram.validate()?;
        self.density.validate()
    }
}

impl BoxPlotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.outlier_r.is_finite() && self.outlier_r >= 0.0) {
            return Err(ConfigError::OutOfRange(format!(
                "box_plot.outlier_r must be non-negative, got {}",
                self.outlier_r
            )));
        }
        check_width("box_plot.width", self.width)
    }
}

impl QuantileHistogramConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quantiles.len() < 3 {
            return Err(ConfigError::OutOfRange(format!(
                "quantile_histogram.quantiles needs at least 3 levels, got {}",
                self.quantiles.len()
            )));
        }
        if let Some(q) = self.quantiles.iter().find(|&&q| !(q > 0.0 && q < 1.0)) {
            return Err(ConfigError::OutOfRange(format!(
                "quantile_histogram.quantiles must lie in (0, 1), got {}",
                q
            )));
        }
        check_width("quantile_histogram.width", self.width)
    }
}

impl DensityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette_size < 2 {
            return Err(ConfigError::OutOfRange(format!(
                "density.palette_size must be at least 2, got {}",
                self.palette_size
            )));
        }
        Ok(())
    }
}

fn check_width(field: &str, width: f64) -> Result<(), ConfigError> {
    if !(width.is_finite() && width > 0.0) {
        return Err(ConfigError::OutOfRange(format!(
            "{} must be positive, got {}",
            field, width
        )));
    }
    Ok(())
}

/// Configuration validation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FiligreeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quantile_histogram.quantiles.len(), 11);
        assert!((config.quantile_histogram.quantiles[10] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_json_serialization() {
        let config = FiligreeConfig::default();
        let json = config.to_json().unwrap();
        let parsed = FiligreeConfig::from_json(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed = FiligreeConfig::from_json(r#"{"box_plot": {"outlier_r": 3.0}}"#).unwrap();
        assert_eq!(parsed.box_plot.outlier_r, 3.0);
        assert_eq!(parsed.box_plot.width, 0.8);
        assert_eq!(parsed.density.palette_size, 256);
    }

    #[test]
    fn test_invalid_width() {
        let mut config = FiligreeConfig::default();
        config.box_plot.width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_quantiles() {
        let mut config = FiligreeConfig::default();
        config.quantile_histogram.quantiles = vec![0.25, 0.75];
        assert!(config.validate().is_err());
        config.quantile_histogram.quantiles = vec![0.0, 0.5, 0.75];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_palette_size() {
        let mut config = FiligreeConfig::default();
        config.density.palette_size = 1;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_toml_round_trip() {
        let config = FiligreeConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(FiligreeConfig::from_toml(&text).unwrap(), config);
    }
}
