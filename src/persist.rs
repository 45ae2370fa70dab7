//! JSON storage of strokes and sketches.
//!
//! Paths are stored as resampled point lists with separate coordinate
//! arrays, `{"x": [...], "y": [...]}`, so recordings and sketches share one
//! format and reload through the same trace pipeline.

use std::path::Path as FsPath;

use kurbo::Point;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BrushError;
use crate::path::Path;

/// A point sequence as parallel coordinate arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointList {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl PointList {
    pub fn from_points(points: &[Point]) -> Self {
        Self {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
        }
    }

    /// Rasterize `path` to unit-spaced points.
    pub fn from_path(path: &Path) -> Self {
        Self::from_points(&path.resample())
    }

    pub fn to_points(&self) -> Result<Vec<Point>, BrushError> {
        if self.x.len() != self.y.len() {
            return Err(BrushError::MismatchedPointList {
                x: self.x.len(),
                y: self.y.len(),
            });
        }
        Ok(self
            .x
            .iter()
            .zip(&self.y)
            .map(|(&x, &y)| Point::new(x, y))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Every path of a sketch, in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SketchFile {
    pub paths: Vec<PointList>,
}

impl SketchFile {
    pub fn from_paths(paths: &[Path]) -> Self {
        Self {
            paths: paths.iter().map(PointList::from_path).collect(),
        }
    }

    pub fn load(path: &FsPath) -> Result<Self, BrushError> {
        let text = std::fs::read_to_string(path)?;
        let file: SketchFile = serde_json::from_str(&text)?;
        info!(path = %path.display(), strokes = file.paths.len(), "loaded sketch");
        Ok(file)
    }

    pub fn save(&self, path: &FsPath) -> Result<(), BrushError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        info!(path = %path.display(), strokes = self.paths.len(), "saved sketch");
        Ok(())
    }

    /// Point sequences of every stored path.
    pub fn strokes(&self) -> Result<Vec<Vec<Point>>, BrushError> {
        self.paths.iter().map(PointList::to_points).collect()
    }
}
