//! Parametrized descriptive-statistic metrics
//!
//! A [`Metric`] reduces a numeric sample to one scalar, e.g. "value at
//! the 75th percentile" or "mean plus 1.5 standard deviations". Metrics
//! are small immutable values: parameters are validated once, at
//! construction, and a `Metric` cannot exist with out-of-range
//! parameters. Deserialization goes through the same validation.
//!
//! Metrics plug into grouped summaries through the [`Aggregation`] trait,
//! which any caller type can also implement.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::sample::{finite_sorted, mean, quantile_sorted, std_dev};

/// Largest absolute sigma multiple accepted by sigma metrics
pub const MAX_SIGMA: f64 = 4.0;

/// The metric variants and their parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricKind {
    /// mean + sigma * stddev
    SigmaOffset { sigma: f64 },
    /// width of the band mean ± sigma * stddev
    SigmaRadius { sigma: f64 },
    /// q-th quantile
    Quantile { q: f64 },
    /// Quantile(high) - Quantile(low)
    QuantileRange { low: f64, high: f64 },
    /// fraction of values in [low, high]
    PortionInBounds { low: f64, high: f64 },
    /// fraction of values with |x| <= r
    PortionInRadius { r: f64 },
}

impl MetricKind {
    /// Variant name used for display
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::SigmaOffset { .. } => "SigmaOffset",
            MetricKind::SigmaRadius { .. } => "SigmaRadius",
            MetricKind::Quantile { .. } => "Quantile",
            MetricKind::QuantileRange { .. } => "QuantileRange",
            MetricKind::PortionInBounds { .. } => "PortionInBounds",
            MetricKind::PortionInRadius { .. } => "PortionInRadius",
        }
    }

    /// Lowercase acronym of the variant name
    pub fn acronym(&self) -> &'static str {
        match self {
            MetricKind::SigmaOffset { .. } => "so",
            MetricKind::SigmaRadius { .. } => "sr",
            MetricKind::Quantile { .. } => "q",
            MetricKind::QuantileRange { .. } => "qr",
            MetricKind::PortionInBounds { .. } => "pib",
            MetricKind::PortionInRadius { .. } => "pir",
        }
    }

    /// Parameters in declaration order
    pub fn params(&self) -> Vec<f64> {
        match *self {
            MetricKind::SigmaOffset { sigma } | MetricKind::SigmaRadius { sigma } => vec![sigma],
            MetricKind::Quantile { q } => vec![q],
            MetricKind::PortionInRadius { r } => vec![r],
            MetricKind::QuantileRange { low, high } | MetricKind::PortionInBounds { low, high } => {
                vec![low, high]
            }
        }
    }

    fn validate(&self) -> StatsResult<()> {
        let metric = self.name();
        let fail = |reason: String| Err(StatsError::InvalidMetric { metric, reason });

        if self.params().iter().any(|p| !p.is_finite()) {
            return fail(format!("parameters must be finite, got {:?}", self.params()));
        }

        match *self {
            MetricKind::SigmaOffset { sigma } if sigma.abs() >= MAX_SIGMA => {
                fail(format!("|sigma| must be below {}, got {}", MAX_SIGMA, sigma))
            }
            MetricKind::SigmaRadius { sigma } if !(sigma > 0.0 && sigma < MAX_SIGMA) => {
                fail(format!("sigma must lie in (0, {}), got {}", MAX_SIGMA, sigma))
            }
            MetricKind::Quantile { q } if !(q > 0.0 && q < 1.0) => {
                fail(format!("q must lie in (0, 1), got {}", q))
            }
            MetricKind::QuantileRange { low, high } if !(0.0 < low && low < high && high < 1.0) => {
                fail(format!("need 0 < low < high < 1, got low={} high={}", low, high))
            }
            MetricKind::PortionInBounds { low, high } if low >= high => {
                fail(format!("low must be below high, got low={} high={}", low, high))
            }
            MetricKind::PortionInRadius { r } if r <= 0.0 => {
                fail(format!("r must be positive, got {}", r))
            }
            _ => Ok(()),
        }
    }
}

/// A validated metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MetricKind", into = "MetricKind")]
pub struct Metric(MetricKind);

impl Metric {
    /// The median, `Quantile(0.5)`
    pub const MEDIAN: Metric = Metric(MetricKind::Quantile { q: 0.5 });

    /// Validate and wrap a metric kind
    pub fn new(kind: MetricKind) -> StatsResult<Self> {
        kind.validate()?;
        Ok(Self(kind))
    }

    pub fn sigma_offset(sigma: f64) -> StatsResult<Self> {
        Self::new(MetricKind::SigmaOffset { sigma })
    }

    pub fn sigma_radius(sigma: f64) -> StatsResult<Self> {
        Self::new(MetricKind::SigmaRadius { sigma })
    }

    pub fn quantile(q: f64) -> StatsResult<Self> {
        Self::new(MetricKind::Quantile { q })
    }

    pub fn quantile_range(low: f64, high: f64) -> StatsResult<Self> {
        Self::new(MetricKind::QuantileRange { low, high })
    }

    pub fn portion_in_bounds(low: f64, high: f64) -> StatsResult<Self> {
        Self::new(MetricKind::PortionInBounds { low, high })
    }

    pub fn portion_in_radius(r: f64) -> StatsResult<Self> {
        Self::new(MetricKind::PortionInRadius { r })
    }

    pub fn kind(&self) -> &MetricKind {
        &self.0
    }

    /// Evaluate the metric on a sample
    ///
    /// Non-finite values are skipped. Returns NaN when no finite value
    /// remains.
    pub fn evaluate(&self, sample: &[f64]) -> f64 {
        match self.0 {
            MetricKind::SigmaOffset { sigma } => sigma_offset(sample, sigma),
            MetricKind::SigmaRadius { sigma } => {
                sigma_offset(sample, sigma) - sigma_offset(sample, -sigma)
            }
            MetricKind::Quantile { q } => quantile_sorted(&finite_sorted(sample), q),
            MetricKind::QuantileRange { low, high } => {
                let sorted = finite_sorted(sample);
                quantile_sorted(&sorted, high) - quantile_sorted(&sorted, low)
            }
            MetricKind::PortionInBounds { low, high } => {
                portion(sample, |x| low <= x && x <= high)
            }
            MetricKind::PortionInRadius { r } => portion(sample, |x| x.abs() <= r),
        }
    }

    /// Identifier-safe name, e.g. `qr0_25to0_75` for `QuantileRange(0.25, 0.75)`
    pub fn ident(&self) -> String {
        let params: Vec<String> = self.0.params().iter().map(|p| format!("{:?}", p)).collect();
        format!("{}{}", self.0.acronym(), params.join("to"))
            .replace(['.', '-'], "_")
    }
}

impl TryFrom<MetricKind> for Metric {
    type Error = StatsError;

    fn try_from(kind: MetricKind) -> Result<Self, Self::Error> {
        Self::new(kind)
    }
}

impl From<Metric> for MetricKind {
    fn from(metric: Metric) -> Self {
        metric.0
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.0.params().iter().map(|p| format!("{:?}", p)).collect();
        write!(f, "{}({})", self.0.name(), params.join(", "))
    }
}

fn sigma_offset(sample: &[f64], sigma: f64) -> f64 {
    mean(sample) + sigma * std_dev(sample)
}

fn portion(sample: &[f64], inside: impl Fn(f64) -> bool) -> f64 {
    let (hits, n) = sample
        .iter()
        .filter(|x| x.is_finite())
        .fold((0usize, 0usize), |(h, n), &x| (h + inside(x) as usize, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        hits as f64 / n as f64
    }
}

/// A named reduction of a numeric sample to a scalar
pub trait Aggregation {
    /// Output column name
    fn name(&self) -> String;

    /// Reduce the sample
    fn apply(&self, sample: &[f64]) -> f64;
}

impl Aggregation for Metric {
    fn name(&self) -> String {
        self.ident()
    }

    fn apply(&self, sample: &[f64]) -> f64 {
        self.evaluate(sample)
    }
}

/// An [`Aggregation`] backed by a closure
pub struct FnAggregation<F> {
    name: String,
    f: F,
}

impl<F: Fn(&[f64]) -> f64> Aggregation for FnAggregation<F> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn apply(&self, sample: &[f64]) -> f64 {
        (self.f)(sample)
    }
}

/// Wrap a closure as a named aggregation
pub fn aggregation<F: Fn(&[f64]) -> f64>(name: impl Into<String>, f: F) -> FnAggregation<F> {
    FnAggregation {
        name: name.into(),
        f,
    }
}
