//! Group-wise summaries
//!
//! Summaries are computed in two explicit steps:
//!
//! 1. [`partition`] splits table rows into an ordered map from group key
//!    to row indices.
//! 2. [`GroupSummarizer`] reduces each partition to a [`GroupSummary`]:
//!    extremes, quartiles, mean, count, the requested quantile columns and
//!    the outlier fences derived from the interquartile range.
//!
//! [`flag_outliers`] joins rows back to their group's fences.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::metric::{Aggregation, Metric};
use crate::sample::{finite_sorted, quantile_sorted, SampleStats};
use crate::table::{GroupKey, Table};

/// Default multiple of the IQR used for outlier fences
pub const DEFAULT_OUTLIER_R: f64 = 1.5;

/// Quantile levels computed when none are requested
pub const DEFAULT_QUANTILES: [f64; 3] = [0.25, 0.5, 0.75];

/// Rows of a table grouped by key, in key order
pub type Partition = BTreeMap<GroupKey, Vec<usize>>;

/// Partition the rows of `table` by the categorical column `by`
pub fn partition(table: &Table, by: &str) -> StatsResult<Partition> {
    let keys = table.keys(by)?;
    let mut groups = Partition::new();
    for (row, key) in keys.into_iter().enumerate() {
        groups.entry(key).or_default().push(row);
    }
    tracing::debug!("partitioned {} rows by '{}' into {} groups", table.num_rows(), by, groups.len());
    Ok(groups)
}

/// Column label for a quantile level: 0.25 becomes `q_0250`
pub fn quantile_label(level: f64) -> String {
    format!("q_{:04.0}", level * 1000.0)
}

/// One requested quantile of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileColumn {
    pub level: f64,
    pub label: String,
    pub value: f64,
}

/// Summary row for one group
///
/// `q1 <= q2 <= q3` always holds. Fences satisfy `lower <= q1` and
/// `upper >= q3` for a non-negative outlier multiple; they are not
/// clipped to the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: GroupKey,
    pub qmin: f64,
    pub q1: f64,
    /// Median
    pub q2: f64,
    pub q3: f64,
    pub qmax: f64,
    pub mean: f64,
    /// Finite values in the group
    pub count: usize,
    /// Non-finite values in the group
    pub missing: usize,
    pub iqr: f64,
    /// Lower outlier fence, `q1 - r * iqr`
    pub lower: f64,
    /// Upper outlier fence, `q3 + r * iqr`
    pub upper: f64,
    /// Requested quantiles, ascending by level
    pub quantiles: Vec<QuantileColumn>,
}

impl GroupSummary {
    /// Value of the quantile column at `level`, if it was requested
    pub fn quantile(&self, level: f64) -> Option<f64> {
        self.quantiles
            .iter()
            .find(|c| (c.level - level).abs() < 1e-9)
            .map(|c| c.value)
    }

    /// Whisker ends: fences clamped to the observed extremes
    pub fn whiskers(&self) -> (f64, f64) {
        (self.lower.max(self.qmin), self.upper.min(self.qmax))
    }
}

/// Computes [`GroupSummary`] rows from a table
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummarizer {
    levels: Vec<f64>,
    outlier_r: f64,
    median: Metric,
}

impl Default for GroupSummarizer {
    fn default() -> Self {
        Self {
            levels: DEFAULT_QUANTILES.to_vec(),
            outlier_r: DEFAULT_OUTLIER_R,
            median: Metric::MEDIAN,
        }
    }
}

impl GroupSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request quantile columns at `levels`; sorted and deduplicated
    pub fn with_quantiles(mut self, levels: &[f64]) -> StatsResult<Self> {
        if let Some(&level) = levels.iter().find(|&&l| !(l > 0.0 && l < 1.0)) {
            return Err(StatsError::InvalidQuantileLevel { level });
        }
        let mut levels = levels.to_vec();
        levels.sort_by(f64::total_cmp);
        levels.dedup();
        self.levels = levels;
        Ok(self)
    }

    /// Set the IQR multiple used for the outlier fences
    pub fn with_outlier_r(mut self, r: f64) -> StatsResult<Self> {
        if !(r.is_finite() && r >= 0.0) {
            return Err(StatsError::InvalidParameter {
                name: "outlier_r",
                reason: format!("must be finite and non-negative, got {}", r),
            });
        }
        self.outlier_r = r;
        Ok(self)
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn outlier_r(&self) -> f64 {
        self.outlier_r
    }

    /// Summarize `col` for every group of `by`, in group key order
    pub fn summarize(&self, table: &Table, by: &str, col: &str) -> StatsResult<Vec<GroupSummary>> {
        let values = table.numeric(col)?;
        let groups = partition(table, by)?;
        Ok(self.summarize_partition(&groups, &values))
    }

    /// Summarize pre-partitioned rows of `values`
    pub fn summarize_partition(&self, groups: &Partition, values: &[f64]) -> Vec<GroupSummary> {
        groups
            .iter()
            .map(|(key, rows)| {
                let sample: Vec<f64> = rows.iter().filter_map(|&r| values.get(r).copied()).collect();
                self.summarize_sample(key.clone(), &sample)
            })
            .collect()
    }

    /// Summarize a single group's sample
    pub fn summarize_sample(&self, group: GroupKey, sample: &[f64]) -> GroupSummary {
        let sorted = finite_sorted(sample);
        let stats = SampleStats::from_sorted(&sorted, sample.len() - sorted.len());
        if stats.count == 0 {
            tracing::warn!("group '{}' has no finite values; its summary is NaN", group);
        } else if stats.count < 2 {
            tracing::debug!("group '{}' has {} finite values; quantiles are degenerate", group, stats.count);
        }

        let iqr = stats.iqr();
        let quantiles = self
            .levels
            .iter()
            .map(|&level| QuantileColumn {
                level,
                label: quantile_label(level),
                value: quantile_sorted(&sorted, level),
            })
            .collect();

        GroupSummary {
            group,
            qmin: stats.min,
            q1: stats.q1,
            q2: self.median.evaluate(&sorted),
            q3: stats.q3,
            qmax: stats.max,
            mean: stats.mean,
            count: stats.count,
            missing: stats.missing,
            iqr,
            lower: stats.q1 - self.outlier_r * iqr,
            upper: stats.q3 + self.outlier_r * iqr,
            quantiles,
        }
    }
}

/// Outlier classification of one table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFlag {
    pub row: usize,
    pub group: GroupKey,
    pub value: f64,
    /// `value < lower`
    pub is_low: bool,
    /// `upper < value`
    pub is_high: bool,
    pub is_outlier: bool,
}

/// Flag every row of `table` against its group's fences
///
/// Rows whose group has no summary, and non-finite values, are never
/// flagged.
pub fn flag_outliers(
    table: &Table,
    by: &str,
    col: &str,
    summaries: &[GroupSummary],
) -> StatsResult<Vec<OutlierFlag>> {
    let keys = table.keys(by)?;
    let values = table.numeric(col)?;
    let fences: HashMap<&GroupKey, (f64, f64)> = summaries
        .iter()
        .map(|s| (&s.group, (s.lower, s.upper)))
        .collect();

    Ok(keys
        .into_iter()
        .zip(values)
        .enumerate()
        .map(|(row, (group, value))| {
            let (lower, upper) = fences.get(&group).copied().unwrap_or((f64::NAN, f64::NAN));
            let is_low = value < lower;
            let is_high = upper < value;
            OutlierFlag {
                row,
                group,
                value,
                is_low,
                is_high,
                is_outlier: is_low || is_high,
            }
        })
        .collect())
}

/// Named aggregation results for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    pub group: GroupKey,
    /// `(aggregation name, value)` in the order the aggregations were given
    pub values: Vec<(String, f64)>,
}

impl GroupAggregate {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}

/// Apply several aggregations to `col` within each group of `by`
pub fn aggregate(
    table: &Table,
    by: &str,
    col: &str,
    aggregations: &[&dyn Aggregation],
) -> StatsResult<Vec<GroupAggregate>> {
    let values = table.numeric(col)?;
    let groups = partition(table, by)?;

    Ok(groups
        .into_iter()
        .map(|(group, rows)| {
            let sample: Vec<f64> = rows.iter().filter_map(|&r| values.get(r).copied()).collect();
            let values = aggregations
                .iter()
                .map(|agg| (agg.name(), agg.apply(&sample)))
                .collect();
            GroupAggregate { group, values }
        })
        .collect())
}

/// Count distinct values, in order of first occurrence
pub fn frequency<T: Eq + Hash + Clone>(values: &[T]) -> Vec<(T, usize)> {
    let mut index: HashMap<&T, usize> = HashMap::new();
    let mut counts: Vec<(T, usize)> = Vec::new();
    for v in values {
        match index.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(v, counts.len());
                counts.push((v.clone(), 1));
            }
        }
    }
    counts
}
