//! Shared geometry utilities.

use kurbo::Point;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Perpendicular distance from `p` to the line through `start` and `end`.
///
/// The foot of the perpendicular is not clamped to the segment. A
/// zero-length reference segment yields 0.
pub fn distance_to_line(p: Point, start: Point, end: Point) -> f64 {
    let line = end - start;
    let len_sq = line.hypot2();
    if len_sq == 0.0 {
        return 0.0;
    }
    let u = (p - start).dot(line) / len_sq;
    let foot = start.lerp(end, u);
    distance(p, foot)
}

/// Angle of `p` as seen from `origin`, in radians.
pub fn angle_from(origin: Point, p: Point) -> f64 {
    (p - origin).atan2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_distance() {
        let d = distance_to_line(Point::new(5.0, 3.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn foot_outside_segment_uses_infinite_line() {
        let d = distance_to_line(Point::new(20.0, 2.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 2.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_line_is_zero() {
        let p = Point::new(1.0, 1.0);
        let d = distance_to_line(Point::new(4.0, 5.0), p, p);
        assert_eq!(d, 0.0);
    }
}
