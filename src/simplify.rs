//! Ramer-Douglas-Peucker polyline reduction.
//!
//! Works on the flat elements of a MoveTo/LineTo path. Each recursion keeps
//! its range's first and last point untouched and the two halves are joined
//! on the split point exactly once.

use tracing::debug;

use crate::error::BrushError;
use crate::geom::distance_to_line;
use crate::path::Path;

/// Reduce a polyline path, keeping points at least `tolerance` away from
/// the chord of their span.
///
/// Curved paths are rejected; rasterize them with [`Path::resample`] first.
pub fn simplify(path: &Path, tolerance: f64) -> Result<Path, BrushError> {
    if !path.is_polyline() {
        return Err(BrushError::NotPolyline);
    }
    let simplified = rdp(path, tolerance)?;
    debug!(
        before = path.element_count(),
        after = simplified.element_count(),
        tolerance,
        "simplified polyline"
    );
    Ok(simplified)
}

fn rdp(path: &Path, tolerance: f64) -> Result<Path, BrushError> {
    let points = path.points();
    let n = points.len();
    if n <= 2 {
        return Ok(path.clone());
    }

    let (first, last) = (points[0], points[n - 1]);
    let mut max_distance = 0.0;
    let mut max_index = 0;
    for (i, &p) in points.iter().enumerate().take(n - 1).skip(1) {
        let d = distance_to_line(p, first, last);
        if d > max_distance {
            max_distance = d;
            max_index = i;
        }
    }

    if max_index > 0 && max_distance >= tolerance {
        let mut left = rdp(&path.slice(0..max_index + 1)?, tolerance)?;
        let right = rdp(&path.slice(max_index..n)?, tolerance)?;
        left.append(&right);
        Ok(left)
    } else {
        Ok(Path::from_points(&[first, last]))
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::path::Segment;

    fn pts(coords: &[(f64, f64)]) -> Path {
        let points: Vec<Point> = coords.iter().map(|&(x, y)| Point::new(x, y)).collect();
        Path::from_points(&points)
    }

    #[test]
    fn collapses_colinear_run() {
        let path = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0)]);
        let simplified = simplify(&path, 0.5).unwrap();
        assert_eq!(
            simplified.segments(),
            &[
                Segment::MoveTo(Point::new(0.0, 0.0)),
                Segment::LineTo(Point::new(2.0, 0.0)),
                Segment::LineTo(Point::new(2.0, 1.0)),
            ]
        );
    }

    #[test]
    fn short_paths_are_unchanged() {
        let path = pts(&[(0.0, 0.0), (5.0, 5.0)]);
        assert_eq!(simplify(&path, 100.0).unwrap(), path);
        assert_eq!(simplify(&Path::new(), 1.0).unwrap(), Path::new());
    }

    #[test]
    fn tolerance_boundary_keeps_point() {
        // Peak sits exactly at the tolerance: kept.
        let path = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        assert_eq!(simplify(&path, 1.0).unwrap().element_count(), 3);
        assert_eq!(simplify(&path, 1.000001).unwrap().element_count(), 2);
    }

    #[test]
    fn zigzag_keeps_all_peaks() {
        let path = pts(&[(0.0, 0.0), (1.0, 5.0), (2.0, 0.0), (3.0, 5.0), (4.0, 0.0)]);
        let simplified = simplify(&path, 1.0).unwrap();
        assert_eq!(simplified.points(), path.points());
    }

    #[test]
    fn closed_loop_with_coincident_ends() {
        // First and last coincide: chord is degenerate so every distance is 0.
        let path = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        let simplified = simplify(&path, 1.0).unwrap();
        assert_eq!(simplified.element_count(), 2);
    }

    #[test]
    fn rejects_curves() {
        let mut path = pts(&[(0.0, 0.0)]);
        path.curve_to(Point::new(1.0, 1.0), Point::new(2.0, 1.0), Point::new(3.0, 0.0));
        assert!(matches!(simplify(&path, 1.0), Err(BrushError::NotPolyline)));
    }
}
