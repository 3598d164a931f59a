//! Scatter matrix grid
//!
//! Describes which column pairs get a panel and how each panel is
//! colored. The renderer draws the points; this module only decides the
//! grid. Each column owns a color, and a panel takes the channel average
//! of its two columns' colors so related panels read as a family.

use std::collections::HashMap;

use filigree_stats::{StatsError, Table};
use serde::{Deserialize, Serialize};

use crate::colormap::{distinct_colors, Color};
use crate::config::ScatterMatrixConfig;
use crate::error::{FiligreeResult, LayoutError};
use crate::geometry::PlotData;

/// Gray level unselected points are dimmed by
const MUTED: f32 = 234.0 / 255.0;

/// One x/y column pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPanel {
    pub x: String,
    pub y: String,
    /// Mixed color of the two columns, `#RRGGBB`
    pub color: String,
    /// Dimmed variant for unselected points
    pub muted: String,
    /// Shared axis range, when fixed
    pub range: Option<[f64; 2]>,
}

/// Grid position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridCell {
    Panel(ScatterPanel),
    Spacer,
}

impl GridCell {
    pub fn panel(&self) -> Option<&ScatterPanel> {
        match self {
            GridCell::Panel(p) => Some(p),
            GridCell::Spacer => None,
        }
    }
}

/// `panels[i][j]` pairs y column `i` with x column `j`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterMatrix {
    pub xcols: Vec<String>,
    pub ycols: Vec<String>,
    pub panels: Vec<Vec<GridCell>>,
}

impl ScatterMatrix {
    pub fn nrows(&self) -> usize {
        self.panels.len()
    }

    pub fn ncols(&self) -> usize {
        self.xcols.len()
    }

    pub fn iter_panels(&self) -> impl Iterator<Item = &ScatterPanel> {
        self.panels.iter().flatten().filter_map(GridCell::panel)
    }
}

impl PlotData for ScatterMatrix {}

fn checked_columns(table: &Table, cols: &[&str]) -> FiligreeResult<Vec<String>> {
    cols.iter()
        .map(|&name| -> FiligreeResult<String> {
            let column = table.column(name)?;
            if !column.is_numeric() {
                return Err(StatsError::TypeMismatch {
                    column: name.to_string(),
                    expected: "float or int",
                    actual: column.kind_name(),
                }
                .into());
            }
            Ok(name.to_string())
        })
        .collect()
}

/// Grid of pairwise scatter panels
///
/// Either column list defaults to the other; with neither, every numeric
/// column is used on both axes. Columns missing from `colors` get a
/// generated color seeded by `config.color_seed`.
pub fn scatter_matrix(
    table: &Table,
    xcols: Option<&[&str]>,
    ycols: Option<&[&str]>,
    config: &ScatterMatrixConfig,
    colors: Option<&HashMap<String, Color>>,
    range: Option<[f64; 2]>,
) -> FiligreeResult<ScatterMatrix> {
    let numeric;
    let (xcols, ycols) = match (xcols, ycols) {
        (Some(x), Some(y)) => (x, y),
        (Some(x), None) => (x, x),
        (None, Some(y)) => (y, y),
        (None, None) => {
            numeric = table.numeric_columns();
            (numeric.as_slice(), numeric.as_slice())
        }
    };
    let xcols = checked_columns(table, xcols)?;
    let ycols = checked_columns(table, ycols)?;
    if xcols.is_empty() || ycols.is_empty() {
        return Err(LayoutError::EmptyInput { what: "columns" }.into());
    }

    let mut all: Vec<&String> = Vec::new();
    for c in xcols.iter().chain(&ycols) {
        if !all.contains(&c) {
            all.push(c);
        }
    }
    let generated = distinct_colors(all.len(), config.color_seed);
    let color_of: HashMap<&str, Color> = all
        .iter()
        .zip(generated)
        .map(|(c, g)| {
            let chosen = colors.and_then(|m| m.get(c.as_str())).copied().unwrap_or(g);
            (c.as_str(), chosen)
        })
        .collect();

    let panels: Vec<Vec<GridCell>> = ycols
        .iter()
        .enumerate()
        .map(|(i, y)| {
            xcols
                .iter()
                .enumerate()
                .map(|(j, x)| {
                    if i < j && !config.full {
                        return GridCell::Spacer;
                    }
                    let mixed = Color::mix(&color_of[x.as_str()], &color_of[y.as_str()]);
                    GridCell::Panel(ScatterPanel {
                        x: x.clone(),
                        y: y.clone(),
                        color: mixed.to_hex(),
                        muted: mixed.scaled(MUTED).to_hex(),
                        range,
                    })
                })
                .collect()
        })
        .collect();

    tracing::debug!("scatter matrix {}x{}", ycols.len(), xcols.len());
    Ok(ScatterMatrix { xcols, ycols, panels })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new()
            .with_column("a", vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_column("b", vec![2.0, 4.0, 8.0])
            .unwrap()
            .with_column("label", vec!["x", "y", "z"])
            .unwrap()
            .with_column("c", vec![1i64, 0, 1])
            .unwrap()
    }

    #[test]
    fn test_lower_triangle_by_default() {
        let m = scatter_matrix(&table(), None, None, &ScatterMatrixConfig::default(), None, None).unwrap();
        assert_eq!(m.xcols, vec!["a", "b", "c"]);
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.ncols(), 3);
        assert_eq!(m.iter_panels().count(), 6);
        assert!(m.panels[0][1].panel().is_none());
        assert!(m.panels[2][0].panel().is_some());
    }

    #[test]
    fn test_full_grid() {
        let config = ScatterMatrixConfig {
            full: true,
            ..Default::default()
        };
        let m = scatter_matrix(&table(), Some(&["a", "b"][..]), None, &config, None, Some([0.0, 10.0])).unwrap();
        assert_eq!(m.iter_panels().count(), 4);
        assert!(m.iter_panels().all(|p| p.range == Some([0.0, 10.0])));
    }

    #[test]
    fn test_colors_mix_and_mute() {
        let mut colors = HashMap::new();
        colors.insert("a".to_string(), Color::rgb(1.0, 0.0, 0.0));
        colors.insert("b".to_string(), Color::rgb(0.0, 0.0, 1.0));
        let m = scatter_matrix(
            &table(),
            Some(&["a", "b"][..]),
            None,
            &ScatterMatrixConfig::default(),
            Some(&colors),
            None,
        )
        .unwrap();

        let diag = m.panels[0][0].panel().unwrap();
        assert_eq!(diag.color, "#FF0000");
        assert_eq!(diag.muted, "#EA0000");
        let off = m.panels[1][0].panel().unwrap();
        assert_eq!((off.x.as_str(), off.y.as_str()), ("a", "b"));
        assert_eq!(off.color, "#800080");
    }

    #[test]
    fn test_text_column_rejected() {
        let err = scatter_matrix(
            &table(),
            Some(&["a", "label"][..]),
            None,
            &ScatterMatrixConfig::default(),
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("label"));
    }
}
