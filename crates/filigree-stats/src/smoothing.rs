//! Trend smoothers over (x, y) samples
//!
//! - [`MetricSmoother`]: any [`Aggregation`] of the y values inside a
//!   sliding x window (a rolling median, rolling 90th percentile, ...)
//! - [`NormalSmoother`]: Gaussian-kernel weighted mean of y
//!
//! Points with a non-finite x or y are dropped at construction.

use std::f64::consts::PI;

use crate::error::{StatsError, StatsResult};
use crate::metric::{Aggregation, Metric};
use crate::sample::finite_sorted;

/// Default smoothing window for a set of x positions
///
/// The larger of 1/20 of the x range and 1.05 times the widest gap
/// between neighbouring x values, so every window holds at least one point.
/// Constant x has no scale to infer from and is an error.
pub fn default_window(x: &[f64]) -> StatsResult<f64> {
    let sorted = finite_sorted(x);
    if sorted.len() < 2 {
        return Err(StatsError::InvalidParameter {
            name: "window",
            reason: format!("need at least 2 finite x values to infer it, got {}", sorted.len()),
        });
    }
    let max_gap = sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(0.0_f64, f64::max);
    let range = sorted[sorted.len() - 1] - sorted[0];
    let window = (range / 20.0).max(1.05 * max_gap);
    if !(window.is_finite() && window > 0.0) {
        return Err(StatsError::InvalidParameter {
            name: "window",
            reason: format!("x values span {}, cannot infer a positive window", range),
        });
    }
    Ok(window)
}

fn resolve_window(x: &[f64], window: Option<f64>) -> StatsResult<f64> {
    match window {
        Some(w) if w.is_finite() && w > 0.0 => Ok(w),
        Some(w) => Err(StatsError::InvalidParameter {
            name: "window",
            reason: format!("must be finite and positive, got {}", w),
        }),
        None => default_window(x),
    }
}

fn finite_pairs(x: &[f64], y: &[f64]) -> StatsResult<(Vec<f64>, Vec<f64>)> {
    if x.len() != y.len() {
        return Err(StatsError::MismatchedInputs {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    Ok(x.iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .unzip())
}

/// Rolling aggregation of y over a fixed-width x window
#[derive(Debug, Clone)]
pub struct MetricSmoother<A = Metric> {
    x: Vec<f64>,
    y: Vec<f64>,
    metric: A,
    window: f64,
}

impl<A: Aggregation> MetricSmoother<A> {
    /// Build a smoother; `window = None` picks [`default_window`]
    pub fn new(x: &[f64], y: &[f64], metric: A, window: Option<f64>) -> StatsResult<Self> {
        let (x, y) = finite_pairs(x, y)?;
        let window = resolve_window(&x, window)?;
        Ok(Self { x, y, metric, window })
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    /// Aggregate the y values with `|at - x| < window` at each query point
    ///
    /// A query point with no neighbours gets whatever the aggregation
    /// returns for an empty sample (NaN for metrics).
    pub fn smooth(&self, at: &[f64]) -> Vec<f64> {
        at.iter()
            .map(|&q| {
                let near: Vec<f64> = self
                    .x
                    .iter()
                    .zip(&self.y)
                    .filter(|(x, _)| (q - **x).abs() < self.window)
                    .map(|(_, &y)| y)
                    .collect();
                self.metric.apply(&near)
            })
            .collect()
    }
}

/// Rolling quantile of y
pub fn quantile_smoother(
    x: &[f64],
    y: &[f64],
    q: f64,
    window: Option<f64>,
) -> StatsResult<MetricSmoother<Metric>> {
    MetricSmoother::new(x, y, Metric::quantile(q)?, window)
}

/// Gaussian-kernel weighted mean of y
#[derive(Debug, Clone)]
pub struct NormalSmoother {
    x: Vec<f64>,
    y: Vec<f64>,
    window: f64,
}

impl NormalSmoother {
    /// Build a smoother; `window` is the kernel's standard deviation
    pub fn new(x: &[f64], y: &[f64], window: Option<f64>) -> StatsResult<Self> {
        let (x, y) = finite_pairs(x, y)?;
        let window = resolve_window(&x, window)?;
        Ok(Self { x, y, window })
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    pub fn smooth(&self, at: &[f64]) -> Vec<f64> {
        at.iter()
            .map(|&q| {
                let (num, den) = self.x.iter().zip(&self.y).fold((0.0, 0.0), |(num, den), (&x, &y)| {
                    let w = normal_pdf((q - x) / self.window);
                    (num + w * y, den + w)
                });
                num / den
            })
            .collect()
    }
}

fn normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}
