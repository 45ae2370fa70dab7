//! Nearest point on a path.
//!
//! There is no closed-form projection onto a general Bezier path, so the
//! search samples coarsely, then refines around the best sample by probing
//! half an interval either side and halving the interval when neither probe
//! improves. The result is a local minimum; `coarse_step` must be small
//! enough for the first phase to land in the right basin.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::geom::distance;
use crate::path::{Path, Sampler};

/// Tolerance and coarse sampling step of a nearest-point search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Refinement stops once the probe interval is below this.
    pub tolerance: f64,
    /// Parameter spacing of the first, exhaustive phase.
    pub coarse_step: f64,
}

impl SearchParams {
    pub fn new(tolerance: f64, coarse_step: f64) -> Self {
        Self {
            tolerance,
            coarse_step,
        }
    }

    /// Cheap search used to rank candidate paths.
    pub fn coarse() -> Self {
        Self::new(0.01, 0.1)
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::new(1e-4, 0.1)
    }
}

/// Parameter and distance of the best point found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub t: f64,
    pub distance: f64,
}

/// Parameter of the point on `path` closest to `target`.
///
/// Returns `None` for an empty path.
pub fn nearest_parameter(path: &Path, target: Point, params: SearchParams) -> Option<Nearest> {
    if path.is_empty() {
        return None;
    }
    let step = if params.coarse_step.is_finite() && params.coarse_step > 0.0 {
        params.coarse_step.min(1.0)
    } else {
        SearchParams::default().coarse_step
    };
    let sampler = path.sampler();
    let seed = coarse_seed(&sampler, target, step);
    Some(refine(&sampler, target, seed, step, params.tolerance))
}

/// The point on `path` closest to `target`.
pub fn nearest_point(path: &Path, target: Point, params: SearchParams) -> Option<Point> {
    nearest_parameter(path, target, params).map(|hit| path.sample(hit.t))
}

/// Best of the evenly spaced samples `0, step, 2*step, ..., 1`.
///
/// `step` must be finite and in `(0, 1]`.
fn coarse_seed(sampler: &Sampler, target: Point, step: f64) -> Nearest {
    let count = (1.0 / step).round() as usize + 1;
    let mut best = Nearest {
        t: 0.0,
        distance: f64::INFINITY,
    };
    for i in 0..count {
        let t = i as f64 / (count - 1) as f64;
        let d = distance(target, sampler.at(t));
        if d < best.distance {
            best = Nearest { t, distance: d };
        }
    }
    best
}

fn refine(sampler: &Sampler, target: Point, seed: Nearest, step: f64, tolerance: f64) -> Nearest {
    let tolerance = tolerance.max(f64::EPSILON);
    let mut best = seed;
    let mut interval = 2.0 * step;
    while interval > tolerance {
        let t_minus = (best.t - interval / 2.0).max(0.0);
        let t_plus = (best.t + interval / 2.0).min(1.0);
        let d_minus = distance(target, sampler.at(t_minus));
        let d_plus = distance(target, sampler.at(t_plus));
        if d_minus < best.distance {
            best = Nearest {
                t: t_minus,
                distance: d_minus,
            };
        } else if d_plus < best.distance {
            best = Nearest {
                t: t_plus,
                distance: d_plus,
            };
        } else {
            interval /= 2.0;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Path {
        Path::from_points(&[Point::ZERO, Point::new(10.0, 0.0)])
    }

    #[test]
    fn projects_onto_straight_line() {
        let hit = nearest_parameter(&line(), Point::new(5.0, 3.0), SearchParams::default()).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-3);
        assert!((hit.distance - 3.0).abs() < 1e-6);
    }

    #[test]
    fn refines_between_samples() {
        let hit =
            nearest_parameter(&line(), Point::new(3.37, -1.0), SearchParams::default()).unwrap();
        assert!((hit.t - 0.337).abs() < 1e-3);
        let p = nearest_point(&line(), Point::new(3.37, -1.0), SearchParams::default()).unwrap();
        assert!((p.x - 3.37).abs() < 1e-2);
    }

    #[test]
    fn invalid_coarse_step_still_refines() {
        for step in [f64::NAN, 0.0, -0.5] {
            let params = SearchParams::new(1e-4, step);
            let hit = nearest_parameter(&line(), Point::new(3.37, 1.0), params).unwrap();
            assert!((hit.t - 0.337).abs() < 1e-3, "step {step}: t = {}", hit.t);
            assert!((hit.distance - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn clamps_beyond_ends() {
        let hit =
            nearest_parameter(&line(), Point::new(-4.0, 3.0), SearchParams::default()).unwrap();
        assert_eq!(hit.t, 0.0);
        assert!((hit.distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn never_worse_than_coarse_phase() {
        let mut path = Path::from_points(&[Point::ZERO]);
        path.curve_to(Point::new(0.0, 40.0), Point::new(60.0, -40.0), Point::new(60.0, 10.0));
        let sampler = path.sampler();
        for target in [Point::new(13.0, 7.0), Point::new(40.0, -2.0), Point::new(70.0, 30.0)] {
            let seed = coarse_seed(&sampler, target, 0.1);
            let hit = nearest_parameter(&path, target, SearchParams::default()).unwrap();
            assert!(hit.distance <= seed.distance);
        }
    }

    #[test]
    fn empty_path_has_no_nearest() {
        assert!(nearest_parameter(&Path::new(), Point::ZERO, SearchParams::default()).is_none());
    }
}
