//! Two-dimensional histogram as colored rectangles
//!
//! Each grid cell becomes one rectangle. Count is normalized two ways:
//! `density` against the fullest cell (so it lies in [0, 1] and the
//! fullest cell is exactly 1) and `share` against every row of the input.
//! Density picks the palette entry.
//!
//! With `group_largest`, cells sharing the most common palette entry are
//! merged into one background rectangle spanning the whole grid, which
//! keeps mostly-empty grids cheap to draw.

use filigree_stats::{frequency, Table};
use serde::{Deserialize, Serialize};

use crate::colormap::{cividis, Palette};
use crate::config::DensityConfig;
use crate::error::{validation, FiligreeResult, LayoutError, LayoutResult};
use crate::geometry::PlotData;
use crate::histogram::{bin_index, Bins};

/// Counts on a rectangular grid, `counts[i][j]` for x bin `i`, y bin `j`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid2D {
    pub counts: Vec<Vec<usize>>,
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    /// Input rows, counted or not
    pub total_rows: usize,
}

impl Grid2D {
    pub fn nx(&self) -> usize {
        self.x_edges.len().saturating_sub(1)
    }

    pub fn ny(&self) -> usize {
        self.y_edges.len().saturating_sub(1)
    }

    /// Check that `counts` is `nx` by `ny` over at least one bin per axis
    pub fn validate(&self) -> LayoutResult<()> {
        let (nx, ny) = (self.nx(), self.ny());
        if nx == 0 || ny == 0 {
            return Err(LayoutError::InvalidBins {
                message: format!(
                    "grid needs at least 2 edges per axis, got {} x and {} y",
                    self.x_edges.len(),
                    self.y_edges.len()
                ),
            });
        }
        if self.counts.len() != nx || self.counts.iter().any(|col| col.len() != ny) {
            return Err(LayoutError::InvalidBins {
                message: format!("counts do not match the {}x{} bins of the edges", nx, ny),
            });
        }
        Ok(())
    }

    /// Largest cell count
    pub fn max(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Rows that landed inside the grid
    pub fn counted(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// Count `(x, y)` pairs into a grid
///
/// Pairs with a non-finite coordinate are skipped. `Count` bins span the
/// range of the remaining pairs.
pub fn histogram2d(x: &[f64], y: &[f64], x_bins: &Bins, y_bins: &Bins) -> LayoutResult<Grid2D> {
    validation::validate_paired(x.len(), y.len())?;

    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .unzip();

    let x_edges = x_bins.edges(&xs)?;
    let y_edges = y_bins.edges(&ys)?;
    let mut counts = vec![vec![0usize; y_edges.len() - 1]; x_edges.len() - 1];
    for (&a, &b) in xs.iter().zip(&ys) {
        if let (Some(i), Some(j)) = (bin_index(&x_edges, a), bin_index(&y_edges, b)) {
            counts[i][j] += 1;
        }
    }

    Ok(Grid2D {
        counts,
        x_edges,
        y_edges,
        total_rows: x.len(),
    })
}

/// Rectangles of a 2D histogram
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DensityCells {
    pub x: Vec<[f64; 4]>,
    pub y: Vec<[f64; 4]>,
    /// Fill color as `#RRGGBB`
    pub color: Vec<String>,
    /// Rows in the rectangle
    pub frequency: Vec<usize>,
    /// Count relative to the fullest cell
    pub density: Vec<f64>,
    /// Count relative to all input rows
    pub share: Vec<f64>,
}

impl DensityCells {
    fn push(&mut self, x: [f64; 4], y: [f64; 4], color: String, frequency: usize, density: f64, share: f64) {
        self.x.push(x);
        self.y.push(y);
        self.color.push(color);
        self.frequency.push(frequency);
        self.density.push(density);
        self.share.push(share);
    }

    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }
}

/// Complete 2D histogram layout
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Histogram2DData {
    pub histogram2d: DensityCells,
}

impl PlotData for Histogram2DData {}

fn rect(x0: f64, x1: f64, y0: f64, y1: f64) -> ([f64; 4], [f64; 4]) {
    (
        [0.0, 1.0, 1.0, 0.0].map(|u| u * (x1 - x0) + x0),
        [0.0, 0.0, 1.0, 1.0].map(|u| u * (y1 - y0) + y0),
    )
}

/// Lay out a counted grid with `palette`
pub fn density_layout(grid: &Grid2D, palette: &Palette, group_largest: bool) -> LayoutResult<DensityCells> {
    grid.validate()?;
    let max = grid.max();
    if max == 0 {
        return Err(LayoutError::EmptyInput { what: "grid" });
    }
    let max = max as f64;
    let total = grid.total_rows as f64;

    // row-major: x bin outer, y bin inner
    let cells: Vec<(usize, usize, usize, usize)> = grid
        .counts
        .iter()
        .enumerate()
        .flat_map(|(i, col)| {
            col.iter()
                .enumerate()
                .map(move |(j, &n)| (i, j, n, palette.index_for(n as f64 / max)))
        })
        .collect();

    let mode = if group_largest {
        let levels: Vec<usize> = cells.iter().map(|c| c.3).collect();
        frequency(&levels)
            .into_iter()
            .fold(None, |best: Option<(usize, usize)>, (level, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((level, n)),
            })
            .map(|(level, _)| level)
    } else {
        None
    };

    let mut out = DensityCells::default();
    if let Some(level) = mode {
        let grouped: usize = cells.iter().filter(|c| c.3 == level).map(|c| c.2).sum();
        let (x, y) = rect(
            grid.x_edges[0],
            grid.x_edges[grid.nx()],
            grid.y_edges[0],
            grid.y_edges[grid.ny()],
        );
        let color = palette.get(level).copied().unwrap_or_default().to_hex();
        let density = level as f64 / palette.len().saturating_sub(1).max(1) as f64;
        out.push(x, y, color, grouped, density, grouped as f64 / total);
    }

    for &(i, j, n, level) in &cells {
        if mode == Some(level) {
            continue;
        }
        let (x, y) = rect(grid.x_edges[i], grid.x_edges[i + 1], grid.y_edges[j], grid.y_edges[j + 1]);
        let density = n as f64 / max;
        out.push(x, y, palette.color_for(density).to_hex(), n, density, n as f64 / total);
    }

    tracing::debug!(
        "{}x{} density grid laid out as {} rectangles",
        grid.nx(),
        grid.ny(),
        out.len()
    );
    Ok(out)
}

/// 2D histogram of two numeric table columns
///
/// Without a `palette`, cells are colored from cividis quantized to
/// `config.palette_size` entries.
pub fn histogram2d_layout(
    table: &Table,
    xcol: &str,
    ycol: &str,
    x_bins: &Bins,
    y_bins: &Bins,
    config: &DensityConfig,
    palette: Option<&Palette>,
) -> FiligreeResult<Histogram2DData> {
    config.validate()?;
    let x = table.numeric(xcol)?;
    let y = table.numeric(ycol)?;
    let grid = histogram2d(&x, &y, x_bins, y_bins)?;
    if grid.counted() < grid.total_rows {
        tracing::debug!(
            "{} of {} rows fell outside the grid",
            grid.total_rows - grid.counted(),
            grid.total_rows
        );
    }

    let default_palette;
    let palette = match palette {
        Some(p) => p,
        None => {
            default_palette = Palette::from_colormap(&cividis(), config.palette_size as usize)?;
            &default_palette
        }
    };
    Ok(Histogram2DData {
        histogram2d: density_layout(&grid, palette, config.group_largest)?,
    })
}
