//! Box-and-whisker layout
//!
//! [`box_glyph`] turns one [`GroupSummary`] into a single NaN-separated
//! polyline: the box from q1 to q3, the median tick, both whiskers and
//! their caps. Whiskers end at the fences clamped to the observed
//! extremes, so they never reach past the data.
//!
//! [`box_plots`] runs the whole pipeline for a table: summaries, outlier
//! flags, centers and jitter.

use std::collections::HashMap;

use filigree_stats::{flag_outliers, GroupKey, GroupSummarizer, GroupSummary, Table};
use serde::{Deserialize, Serialize};

use crate::config::BoxPlotConfig;
use crate::error::{validation, FiligreeResult, LayoutResult};
use crate::geometry::{PlotData, Polyline};
use crate::placement::{jitter, resolve_centers, CenterMap, SeededRng};

const NAN: f64 = f64::NAN;

/// Unit x template before the -0.5 shift: box, median, two whiskers, two caps
const BOX_X: [f64; 20] = [
    0.0, 1.0, 1.0, 0.0, 0.0, NAN, 0.0, 1.0, NAN, 0.5, 0.5, NAN, 0.5, 0.5, NAN, 0.0, 1.0, NAN, 0.0, 1.0,
];

/// Polyline for one box, centered at `center`, `width` wide
pub fn box_glyph(summary: &GroupSummary, center: f64, width: f64) -> LayoutResult<Polyline> {
    validation::validate_width(width)?;

    let (q0, q4) = summary.whiskers();
    let (q1, q2, q3) = (summary.q1, summary.q2, summary.q3);
    let y = vec![
        q1, q1, q3, q3, q1, NAN, q2, q2, NAN, q0, q1, NAN, q3, q4, NAN, q0, q0, NAN, q4, q4,
    ];
    let x = BOX_X.iter().map(|&u| (u - 0.5) * width + center).collect();

    Ok(Polyline { x, y })
}

/// Per-group box glyphs and outlier tallies
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Boxes {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub group: Vec<GroupKey>,
    /// Low outliers per group
    pub nlo: Vec<usize>,
    /// High outliers per group
    pub nho: Vec<usize>,
    /// Low outliers as a fraction of the group's values
    pub plo: Vec<f64>,
    /// High outliers as a fraction of the group's values
    pub pho: Vec<f64>,
    /// Finite values per group
    pub n: Vec<usize>,
}

/// Individual outlier points
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outliers {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub group: Vec<GroupKey>,
}

/// Horizontal mean markers, one two-point line per group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Means {
    pub x: Vec<[f64; 2]>,
    pub y: Vec<[f64; 2]>,
    pub group: Vec<GroupKey>,
}

/// Complete box plot layout
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxPlotData {
    pub boxes: Boxes,
    pub outliers: Outliers,
    pub means: Means,
}

impl PlotData for BoxPlotData {}

/// Box plots of `col` for every group of `by`
pub fn box_plots(
    table: &Table,
    by: &str,
    col: &str,
    config: &BoxPlotConfig,
    centers: Option<&CenterMap>,
) -> FiligreeResult<BoxPlotData> {
    validation::validate_width(config.width)?;

    let summaries = GroupSummarizer::new()
        .with_outlier_r(config.outlier_r)?
        .summarize(table, by, col)?;
    let flags = flag_outliers(table, by, col, &summaries)?;

    let keys: Vec<GroupKey> = summaries.iter().map(|s| s.group.clone()).collect();
    let positions = resolve_centers(&keys, centers)?;
    let center_of: HashMap<&GroupKey, f64> = keys.iter().zip(positions.iter().copied()).collect();

    let mut tallies: HashMap<&GroupKey, (usize, usize)> = HashMap::new();
    for flag in &flags {
        let entry = tallies.entry(&flag.group).or_default();
        entry.0 += flag.is_low as usize;
        entry.1 += flag.is_high as usize;
    }

    let mut data = BoxPlotData::default();
    for (summary, &center) in summaries.iter().zip(&positions) {
        let glyph = box_glyph(summary, center, config.width)?;
        let (nlo, nho) = tallies.get(&summary.group).copied().unwrap_or_default();
        let n = summary.count;

        let boxes = &mut data.boxes;
        boxes.x.push(glyph.x);
        boxes.y.push(glyph.y);
        boxes.group.push(summary.group.clone());
        boxes.nlo.push(nlo);
        boxes.nho.push(nho);
        boxes.plo.push(nlo as f64 / n as f64);
        boxes.pho.push(nho as f64 / n as f64);
        boxes.n.push(n);

        let half = 0.5 * config.width;
        data.means.x.push([center - half, center + half]);
        data.means.y.push([summary.mean, summary.mean]);
        data.means.group.push(summary.group.clone());
    }

    let mut rng = SeededRng::new(config.jitter_seed);
    for flag in flags.iter().filter(|f| f.is_outlier) {
        let Some(&center) = center_of.get(&flag.group) else {
            continue;
        };
        let offset = if config.jitter {
            jitter(&mut rng, config.width)
        } else {
            0.0
        };
        data.outliers.x.push(center + offset);
        data.outliers.y.push(flag.value);
        data.outliers.group.push(flag.group.clone());
    }

    tracing::debug!(
        "laid out {} boxes with {} outliers for '{}' by '{}'",
        data.boxes.group.len(),
        data.outliers.x.len(),
        col,
        by
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> GroupSummary {
        GroupSummarizer::new().summarize_sample(GroupKey::Int(0), &[1.0, 2.0, 3.0, 4.0, 5.0])
    }

    #[test]
    fn test_box_glyph_shape() {
        let glyph = box_glyph(&summary(), 2.0, 1.0).unwrap();
        assert_eq!(glyph.x.len(), 20);
        assert_eq!(glyph.y.len(), 20);

        let segs = glyph.segments();
        assert_eq!(segs.len(), 6);
        // box outline is closed
        assert_eq!(segs[0].first(), segs[0].last());
        // median tick spans the box width
        assert_eq!(segs[1], vec![(1.5, 3.0), (2.5, 3.0)]);
    }

    #[test]
    fn test_whiskers_clamp_to_data() {
        // fences are -1 and 7, data spans 1..5
        let glyph = box_glyph(&summary(), 0.0, 1.0).unwrap();
        let segs = glyph.segments();
        assert_eq!(segs[2], vec![(0.0, 1.0), (0.0, 2.0)]);
        assert_eq!(segs[3], vec![(0.0, 4.0), (0.0, 5.0)]);
    }

    #[test]
    fn test_whiskers_clamp_to_fences() {
        let s = GroupSummarizer::new()
            .summarize_sample(GroupKey::Int(0), &[-50.0, 1.0, 2.0, 3.0, 4.0, 5.0, 60.0]);
        let glyph = box_glyph(&s, 0.0, 1.0).unwrap();
        let (q0, q4) = s.whiskers();
        assert_eq!(q0, s.lower);
        assert_eq!(q4, s.upper);
        assert_eq!(glyph.y[9], s.lower);
        assert_eq!(glyph.y[13], s.upper);
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(box_glyph(&summary(), 0.0, 0.0).is_err());
    }
}
