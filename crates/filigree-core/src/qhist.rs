//! Quantile-binned histograms
//!
//! Bin edges sit at quantiles of the data rather than at fixed values.
//! Each bin between quantile levels `l_i < l_j` covers the value span
//! `[v_i, v_j]`, and its height is the density `(l_j - l_i) / (v_j - v_i)`,
//! so bin area is proportional to the quantile mass it holds. Heights are
//! normalized so the tallest bin is exactly `width` tall.
//!
//! A bin whose two quantiles coincide has no width to carry its mass; it
//! is kept (so bins stay aligned with level pairs), flagged `degenerate`,
//! drawn with zero height, and left out of the normalization.

use filigree_stats::{GroupKey, GroupSummarizer, GroupSummary, Table};
use serde::{Deserialize, Serialize};

use crate::config::QuantileHistogramConfig;
use crate::error::{validation, FiligreeResult, LayoutError, LayoutResult};
use crate::geometry::{Patch, PlotData};
use crate::placement::{resolve_centers, CenterMap};

/// Transform applied to bin heights before normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum HeightTransform {
    #[default]
    Identity,
    /// Compresses tall bins so tail detail stays visible in small multiples
    Sqrt,
}

impl HeightTransform {
    pub fn apply(self, v: f64) -> f64 {
        match self {
            HeightTransform::Identity => v,
            HeightTransform::Sqrt => v.sqrt(),
        }
    }
}

/// One bin of a quantile histogram, laid out horizontally
///
/// `patch.x` runs along the value axis, `patch.y` along the height axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileBin {
    pub lower_level: f64,
    pub upper_level: f64,
    /// Value at `lower_level`
    pub lower: f64,
    /// Value at `upper_level`
    pub upper: f64,
    /// Density (or mass when `absolute`) before transform and normalization
    pub scale: f64,
    /// Final height in axis units
    pub height: f64,
    /// The two quantiles coincide
    pub degenerate: bool,
    pub patch: Patch,
}

impl QuantileBin {
    /// Quantile mass held by the bin
    pub fn mass(&self) -> f64 {
        self.upper_level - self.lower_level
    }

    /// Width of the bin on the value axis
    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Bins for one summary row, using its quantile columns as edges
pub fn quantile_bins(
    summary: &GroupSummary,
    config: &QuantileHistogramConfig,
) -> LayoutResult<Vec<QuantileBin>> {
    validation::validate_width(config.width)?;
    if summary.quantiles.len() < 2 {
        return Err(LayoutError::TooFewQuantiles {
            count: summary.quantiles.len(),
            min: 1,
        });
    }

    let mut columns: Vec<(f64, f64)> = summary.quantiles.iter().map(|c| (c.level, c.value)).collect();
    columns.sort_by(|a, b| a.0.total_cmp(&b.0));

    let raw: Vec<(f64, f64, f64, f64, f64, bool)> = columns
        .windows(2)
        .map(|w| {
            let ((l0, v0), (l1, v1)) = (w[0], w[1]);
            let span = v1 - v0;
            let mass = l1 - l0;
            let degenerate = !(span > 0.0);
            let scale = match (degenerate, config.absolute) {
                (true, _) => 0.0,
                (false, true) => mass,
                (false, false) => mass / span,
            };
            (l0, l1, v0, v1, scale, degenerate)
        })
        .collect();

    let flat = raw.iter().filter(|b| b.5).count();
    if flat > 0 {
        tracing::warn!(
            "group '{}': {} of {} quantile bins have zero width and are drawn flat",
            summary.group,
            flat,
            raw.len()
        );
    }

    let max = raw
        .iter()
        .filter(|b| !b.5)
        .map(|b| config.transform.apply(b.4))
        .fold(0.0_f64, f64::max);

    let offset = if config.centered { 0.5 } else { 0.0 };
    Ok(raw
        .into_iter()
        .map(|(l0, l1, v0, v1, scale, degenerate)| {
            let height = if degenerate || max <= 0.0 {
                0.0
            } else {
                config.transform.apply(scale) / max * config.width
            };
            let span = v1 - v0;
            QuantileBin {
                lower_level: l0,
                upper_level: l1,
                lower: v0,
                upper: v1,
                scale,
                height,
                degenerate,
                patch: Patch {
                    x: [0.0, 0.0, 1.0, 1.0].map(|u| u * span + v0),
                    y: [0.0, 1.0, 1.0, 0.0].map(|u| (u - offset) * height),
                },
            }
        })
        .collect())
}

/// Vertical histogram bins of every group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Histograms {
    /// Height-axis corners, shifted to the group center
    pub x: Vec<[f64; 4]>,
    /// Value-axis corners
    pub y: Vec<[f64; 4]>,
    /// Value at the lower quantile level
    pub lower: Vec<f64>,
    /// Value at the upper quantile level
    pub upper: Vec<f64>,
    pub group: Vec<GroupKey>,
    /// Approximate records in the bin, `floor(mass * count)` over the
    /// group's finite values; missing rows are not counted
    pub n: Vec<usize>,
    /// Percentile range label, e.g. `25.0-30.0`
    pub name: Vec<String>,
}

/// Median markers across each histogram
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Medians {
    pub x: Vec<[f64; 2]>,
    pub y: Vec<[f64; 2]>,
    pub group: Vec<GroupKey>,
}

/// Complete quantile histogram layout
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuantileHistogramData {
    pub histograms: Histograms,
    pub medians: Medians,
}

impl PlotData for QuantileHistogramData {}

/// Vertical quantile histograms of `col` for every group of `by`
pub fn qhistograms(
    table: &Table,
    by: &str,
    col: &str,
    config: &QuantileHistogramConfig,
    centers: Option<&CenterMap>,
) -> FiligreeResult<QuantileHistogramData> {
    validation::validate_width(config.width)?;
    let summarizer = GroupSummarizer::new().with_quantiles(&config.quantiles)?;
    validation::validate_quantile_count(summarizer.levels().len())?;

    let summaries = summarizer.summarize(table, by, col)?;
    let keys: Vec<GroupKey> = summaries.iter().map(|s| s.group.clone()).collect();
    let positions = resolve_centers(&keys, centers)?;

    let offset = if config.centered { 0.5 } else { 0.0 };
    let mut data = QuantileHistogramData::default();
    for (summary, &center) in summaries.iter().zip(&positions) {
        for bin in quantile_bins(summary, config)? {
            let vertical = bin.patch.transposed().shifted_x(center);
            let h = &mut data.histograms;
            h.x.push(vertical.x);
            h.y.push(vertical.y);
            h.lower.push(bin.lower);
            h.upper.push(bin.upper);
            h.group.push(summary.group.clone());
            h.n.push((bin.mass() * summary.count as f64).floor() as usize);
            h.name.push(format!(
                "{:4.1}-{:4.1}",
                bin.lower_level * 100.0,
                bin.upper_level * 100.0
            ));
        }

        data.medians.x.push([0.0, 1.0].map(|u| (u - offset) * config.width + center));
        data.medians.y.push([summary.q2, summary.q2]);
        data.medians.group.push(summary.group.clone());
    }

    tracing::debug!(
        "laid out {} quantile bins across {} groups",
        data.histograms.group.len(),
        data.medians.group.len()
    );
    Ok(data)
}
