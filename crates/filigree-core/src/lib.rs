//! filigree-core - Plot-ready layouts for statistical charts
//!
//! This crate turns tables into renderer-agnostic geometry. Every layout
//! returns plain columnar data (coordinates, colors, tallies) that
//! serializes to nested JSON for a plotting front end.
//!
//! # Layouts
//!
//! - **Box plots**: NaN-separated box glyphs, jittered outliers, mean ticks
//! - **Quantile histograms**: bins cut at quantiles, height proportional to density
//! - **2D density**: colored grid rectangles, optionally merging the dominant level
//! - **Histograms**: equal-width or explicit-edge binning
//! - **Scatter matrix**: panel grid with per-column colors
//!
//! Statistics come from [`filigree_stats`], re-exported as [`stats`].

pub mod boxplot;
pub mod colormap;
pub mod config;
pub mod density;
pub mod error;
pub mod geometry;
pub mod histogram;
pub mod placement;
pub mod qhist;
pub mod scatter;

pub use boxplot::*;
pub use colormap::*;
pub use config::*;
pub use density::*;
pub use error::*;
pub use geometry::*;
pub use histogram::*;
pub use placement::*;
pub use qhist::*;
pub use scatter::*;

pub use filigree_stats as stats;

// Setup UniFFI when the feature is enabled
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
