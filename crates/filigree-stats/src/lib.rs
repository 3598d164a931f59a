//! filigree-stats - Statistical primitives for plot-ready summaries
//!
//! This crate provides the statistics behind filigree's chart layouts:
//!
//! - **Table**: in-memory named columns with group keys
//! - **Metric**: validated, parametrized sample reductions (quantiles,
//!   sigma offsets, portions in bounds)
//! - **GroupSummarizer**: per-group quartiles, quantile columns and
//!   outlier fences, plus outlier flagging
//! - **Smoothers**: rolling-metric and Gaussian-kernel trend lines
//!
//! Everything here is a pure function of its inputs. Non-finite values
//! are treated as missing.

pub mod error;
pub mod group;
pub mod metric;
pub mod sample;
pub mod smoothing;
pub mod table;

pub use error::*;
pub use group::*;
pub use metric::*;
pub use sample::*;
pub use smoothing::*;
pub use table::*;

// Setup UniFFI when the feature is enabled
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
