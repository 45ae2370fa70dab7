//! Spline fitting: freehand points → cubic Bezier path.
//!
//! 1. Drop consecutive duplicates and parametrize by chord length
//! 2. Fit a clamped smoothing B-spline (degree 3, or lower for 3 points)
//! 3. Raise interior knot multiplicities to split into Bezier pieces
//! 4. Emit one CubicTo per piece, elevating quadratics

mod bspline;
mod smoothing;

use kurbo::Point;
use tracing::debug;

use crate::error::BrushError;
use crate::path::Path;

/// Highest spline degree fitted.
const MAX_DEGREE: usize = 3;

/// Fit a smooth cubic Bezier path through `points`.
///
/// `smoothing` bounds the sum of squared distances between the points and
/// the curve at their parameters: 0 interpolates every point, larger values
/// trade fidelity for fewer, smoother segments.
pub fn fit(points: &[Point], smoothing: f64) -> Result<Path, BrushError> {
    if points.len() < 3 {
        return Err(BrushError::InsufficientData(points.len()));
    }
    let mut distinct = points.to_vec();
    distinct.dedup();
    if distinct.len() < 3 {
        return Err(BrushError::InsufficientData(distinct.len()));
    }

    let degree = (distinct.len() - 1).min(MAX_DEGREE);
    let u = smoothing::parametrize(&distinct);
    let solved = smoothing::fit_spline(&distinct, &u, degree, smoothing)?;
    let path = to_cubic_path(&solved.spline.bezier_segments());

    debug!(
        points = distinct.len(),
        degree,
        segments = path.segments().len().saturating_sub(1),
        fp = solved.fp,
        "fitted spline"
    );
    Ok(path)
}

/// MoveTo the first anchor, then one CubicTo per control group.
fn to_cubic_path(groups: &[Vec<Point>]) -> Path {
    let mut path = Path::new();
    for group in groups {
        let Some((p0, c1, c2, p3)) = as_cubic(group) else {
            continue;
        };
        if path.is_empty() {
            path.move_to(p0);
        }
        path.curve_to(c1, c2, p3);
    }
    path
}

/// Degree-elevate a control group to cubic form.
fn as_cubic(group: &[Point]) -> Option<(Point, Point, Point, Point)> {
    match *group {
        [p0, c1, c2, p3] => Some((p0, c1, c2, p3)),
        [p0, q, p2] => Some((p0, p0.lerp(q, 2.0 / 3.0), p2.lerp(q, 2.0 / 3.0), p2)),
        [p0, p1] => Some((p0, p0.lerp(p1, 1.0 / 3.0), p0.lerp(p1, 2.0 / 3.0), p1)),
        _ => None,
    }
}
