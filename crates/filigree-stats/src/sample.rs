//! Summary statistics for a numeric sample
//!
//! Provides the scalar reductions the metrics and group summaries are
//! built from:
//! - Mean, population variance, standard deviation
//! - Min, max
//! - Quantiles by linear interpolation between order statistics
//!
//! Non-finite values are treated as missing and skipped everywhere.
//! Reductions over an empty sample return NaN.

use serde::{Deserialize, Serialize};

/// Finite values of `data`, sorted ascending
pub fn finite_sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile of an already sorted, finite sample
///
/// Uses linear interpolation at rank `q * (n - 1)`, so `q = 0` is the
/// minimum and `q = 1` the maximum. `q` is clamped to [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            if lo + 1 >= n {
                return sorted[n - 1];
            }
            let frac = rank - lo as f64;
            // rounding must not carry the result past the upper order statistic
            (sorted[lo] + (sorted[lo + 1] - sorted[lo]) * frac).min(sorted[lo + 1])
        }
    }
}

/// Quantile of an unsorted sample
pub fn quantile(data: &[f64], q: f64) -> f64 {
    quantile_sorted(&finite_sorted(data), q)
}

/// Arithmetic mean of the finite values
pub fn mean(data: &[f64]) -> f64 {
    let (sum, n) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, n), &x| (s + x, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Population standard deviation (divides by n) of the finite values
pub fn std_dev(data: &[f64]) -> f64 {
    let mu = mean(data);
    if mu.is_nan() {
        return f64::NAN;
    }
    let (ss, n) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, n), &x| (s + (x - mu).powi(2), n + 1));
    (ss / n as f64).sqrt()
}

/// Summary statistics for a numeric sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    /// Number of finite values
    pub count: usize,
    /// Number of missing/non-finite values
    pub missing: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    pub std_dev: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub q2: f64,
    /// Third quartile
    pub q3: f64,
}

impl SampleStats {
    /// Compute summary statistics from data
    pub fn from_data(data: &[f64]) -> Self {
        let sorted = finite_sorted(data);
        let missing = data.len() - sorted.len();
        Self::from_sorted(&sorted, missing)
    }

    /// Compute summary statistics from a sorted, finite sample
    pub fn from_sorted(sorted: &[f64], missing: usize) -> Self {
        let count = sorted.len();
        if count == 0 {
            return Self::empty(missing);
        }

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        Self {
            count,
            missing,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            variance,
            std_dev: variance.sqrt(),
            q1: quantile_sorted(sorted, 0.25),
            q2: quantile_sorted(sorted, 0.5),
            q3: quantile_sorted(sorted, 0.75),
        }
    }

    /// Statistics of a sample with no finite values (all NaN)
    fn empty(missing: usize) -> Self {
        Self {
            count: 0,
            missing,
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
            variance: f64::NAN,
            std_dev: f64::NAN,
            q1: f64::NAN,
            q2: f64::NAN,
            q3: f64::NAN,
        }
    }

    /// Interquartile range (q3 - q1)
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&data, 0.5), 2.5);
        assert_eq!(quantile(&data, 0.0), 1.0);
        assert_eq!(quantile(&data, 1.0), 4.0);
        assert!((quantile(&data, 0.25) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_ignores_order_and_nan() {
        let data = [5.0, f64::NAN, 1.0, 3.0];
        assert_eq!(quantile(&data, 0.5), 3.0);
    }

    #[test]
    fn test_quantile_degenerate_samples() {
        assert!(quantile(&[], 0.5).is_nan());
        assert_eq!(quantile(&[7.0], 0.1), 7.0);
        assert_eq!(quantile(&[7.0], 0.9), 7.0);
    }

    #[test]
    fn test_mean_and_std() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&data), 5.0);
        assert_eq!(std_dev(&data), 2.0);
        assert!(mean(&[]).is_nan());
        assert!(std_dev(&[f64::NAN]).is_nan());
    }

    #[test]
    fn test_sample_stats_basic() {
        let data: Vec<f64> = (1..=5).map(|x| x as f64).collect();
        let stats = SampleStats::from_data(&data);

        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q2, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.iqr(), 2.0);
    }

    #[test]
    fn test_sample_stats_with_nan() {
        let stats = SampleStats::from_data(&[1.0, f64::INFINITY, f64::NAN, 4.0]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.missing, 2);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_sample_stats_empty() {
        let stats = SampleStats::from_data(&[f64::NAN]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.q2.is_nan());
    }
}
