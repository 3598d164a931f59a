//! Shapes shared by the layouts
//!
//! A [`Polyline`] is one coordinate pair of arrays in which NaN entries
//! break the line into independent segments. A [`Patch`] is a closed
//! four-corner polygon given without a repeated closing point.

use serde::{Deserialize, Serialize};

use crate::error::FiligreeResult;

/// Coordinates of a line drawn in several pieces, NaN-separated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Polyline {
    /// Split at NaN breaks into runs of `(x, y)` points
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (&x, &y) in self.x.iter().zip(&self.y) {
            if x.is_nan() || y.is_nan() {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            } else {
                current.push((x, y));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// Four-corner polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub x: [f64; 4],
    pub y: [f64; 4],
}

impl Patch {
    /// Swap the axes, turning a horizontal layout into a vertical one
    pub fn transposed(&self) -> Patch {
        Patch {
            x: self.y,
            y: self.x,
        }
    }

    /// Shift horizontally
    pub fn shifted_x(&self, dx: f64) -> Patch {
        Patch {
            x: self.x.map(|v| v + dx),
            y: self.y,
        }
    }

    /// Unsigned area (shoelace formula)
    pub fn area(&self) -> f64 {
        let twice: f64 = (0..4)
            .map(|i| {
                let j = (i + 1) % 4;
                self.x[i] * self.y[j] - self.x[j] * self.y[i]
            })
            .sum();
        twice.abs() / 2.0
    }
}

/// Layout output consumed by a renderer as nested JSON
pub trait PlotData: Serialize {
    fn to_json(&self) -> FiligreeResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn to_value(&self) -> FiligreeResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
