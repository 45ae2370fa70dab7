//! vectorbrush: freehand strokes → editable cubic Bezier paths.
//!
//! The engine behind a sketching canvas: raw pointer strokes are reduced
//! with Ramer-Douglas-Peucker, fitted with a smoothing B-spline and
//! emitted as cubic Bezier paths that can then be bent with a warp brush
//! or edited through anchor and control handles.
//!
//! # Example
//!
//! ```
//! use vectorbrush::{kurbo::Point, trace, EditorConfig};
//!
//! let stroke: Vec<Point> = (0..50)
//!     .map(|i| {
//!         let x = i as f64 * 4.0;
//!         Point::new(x, 40.0 * (x / 40.0).sin())
//!     })
//!     .collect();
//! let path = trace(&stroke, &EditorConfig::default())?;
//! assert!(!path.is_polyline());
//! # Ok::<(), vectorbrush::BrushError>(())
//! ```

#![forbid(unsafe_code)]

mod config;
mod geom;
mod sketch;

pub mod edit;
pub mod error;
pub mod nearest;
pub mod path;
pub mod persist;
pub mod simplify;
pub mod spline;
pub mod warp;

#[cfg(feature = "render")]
pub mod render;

// Re-export kurbo so downstream users get the same Point/Vec2 version.
pub use kurbo;

pub use config::EditorConfig;
pub use edit::{drag_handle, rebuild_handles, Handle, HandleRole, Tool};
pub use error::BrushError;
pub use nearest::{nearest_parameter, Nearest, SearchParams};
pub use path::{ElementKind, Path, PathElement, Segment};
pub use simplify::simplify;
pub use sketch::Sketch;
pub use spline::fit;
pub use warp::{warp, Falloff};

use kurbo::Point;
use tracing::debug;

/// Full stroke pipeline: raw points → simplified polyline → fitted cubics.
///
/// Strokes that simplify to a single line segment are returned as that
/// line, since there is nothing to fit.
pub fn trace(points: &[Point], config: &EditorConfig) -> Result<Path, BrushError> {
    let raw = Path::from_points(points);
    let simplified = simplify(&raw, config.simplify_tolerance)?;
    if simplified.element_count() < 3 {
        debug!(raw = points.len(), "stroke simplified to a line");
        return Ok(simplified);
    }

    match fit(&simplified.points(), config.smoothing) {
        Ok(path) => {
            let (curves, lines) = path.segment_counts();
            debug!(
                raw = points.len(),
                simplified = simplified.element_count(),
                curves,
                lines,
                "traced stroke"
            );
            Ok(path)
        }
        // Loops that double back on themselves can dedupe below three points.
        Err(BrushError::InsufficientData(_)) => Ok(simplified),
        Err(err) => Err(err),
    }
}
