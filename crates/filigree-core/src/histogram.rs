//! Equal-width and explicit-edge binning
//!
//! Bins are half-open `[e_i, e_{i+1})` except the last, which also
//! includes its upper edge. Values outside the edges are not counted.

use filigree_stats::Table;
use serde::{Deserialize, Serialize};

use crate::error::{FiligreeResult, LayoutError, LayoutResult};
use crate::geometry::PlotData;

/// How a value axis is divided into bins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bins {
    /// Equal-width bins over the data range
    Count(usize),
    /// Explicit, strictly increasing edges
    Edges(Vec<f64>),
}

impl Default for Bins {
    fn default() -> Self {
        Bins::Count(10)
    }
}

impl Bins {
    /// Resolve to concrete edges for `values`
    ///
    /// A constant sample gets the range `[v - 0.5, v + 0.5]`.
    pub fn edges(&self, values: &[f64]) -> LayoutResult<Vec<f64>> {
        match self {
            Bins::Count(0) => Err(LayoutError::InvalidBins {
                message: "bin count must be at least 1".to_string(),
            }),
            Bins::Count(n) => {
                let (min, max) = finite_range(values).ok_or(LayoutError::EmptyInput { what: "values" })?;
                let (min, max) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
                let step = (max - min) / *n as f64;
                let mut edges: Vec<f64> = (0..=*n).map(|i| min + i as f64 * step).collect();
                edges[*n] = max;
                Ok(edges)
            }
            Bins::Edges(edges) => {
                if edges.len() < 2 {
                    return Err(LayoutError::InvalidBins {
                        message: format!("need at least 2 edges, got {}", edges.len()),
                    });
                }
                if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(LayoutError::InvalidBins {
                        message: "edges must be finite and strictly increasing".to_string(),
                    });
                }
                Ok(edges.clone())
            }
        }
    }
}

/// Min and max of the finite values, if any
pub(crate) fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Bin holding `value`, or `None` when it falls outside the edges
pub fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    if edges.len() < 2 || !(value >= first && value <= last) {
        return None;
    }
    if value == last {
        return Some(edges.len() - 2);
    }
    Some(edges.partition_point(|&e| e <= value) - 1)
}

/// One-dimensional histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Count per bin
    pub freq: Vec<usize>,
    pub bin_edges: Vec<f64>,
    /// Midpoint of each bin
    pub centers: Vec<f64>,
    /// Width of the first bin
    pub width: f64,
}

impl Histogram {
    /// Values that landed in some bin
    pub fn total(&self) -> usize {
        self.freq.iter().sum()
    }
}

/// Complete histogram layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramData {
    pub histogram: Histogram,
}

impl PlotData for HistogramData {}

/// Count `values` into `bins`
pub fn histogram(values: &[f64], bins: &Bins) -> LayoutResult<Histogram> {
    let bin_edges = bins.edges(values)?;
    let mut freq = vec![0usize; bin_edges.len() - 1];
    for &v in values {
        if let Some(i) = bin_index(&bin_edges, v) {
            freq[i] += 1;
        }
    }

    let centers = bin_edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
    let width = bin_edges[1] - bin_edges[0];

    tracing::debug!("histogram of {} values into {} bins", values.len(), freq.len());
    Ok(Histogram {
        freq,
        bin_edges,
        centers,
        width,
    })
}

/// Histogram of one numeric table column
pub fn column_histogram(table: &Table, col: &str, bins: &Bins) -> FiligreeResult<HistogramData> {
    let values = table.numeric(col)?;
    Ok(HistogramData {
        histogram: histogram(&values, bins)?,
    })
}
