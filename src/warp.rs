//! Radial falloff displacement of a point cloud.
//!
//! Each point within `radius` of the target moves by `delta` scaled by a
//! falloff magnitude that is `strength` at the target and 0 at the radius.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::geom::distance;

/// Shape of the magnitude curve between the target and the radius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Falloff {
    /// `(cos(pi * d / r) + 1) / 2`: zero slope at both the target and the rim.
    #[default]
    Cosine,
    /// `1 - d / r`.
    Linear,
}

impl Falloff {
    /// Magnitude at distance `d`, for `0 <= d < radius`.
    fn weight(self, d: f64, radius: f64) -> f64 {
        match self {
            Falloff::Cosine => ((std::f64::consts::PI * d / radius).cos() + 1.0) / 2.0,
            Falloff::Linear => 1.0 - d / radius,
        }
    }
}

/// Displace `points` by `delta` around `target`.
///
/// Points at or beyond `radius` are returned unchanged, as is every point
/// when `radius <= 0`.
pub fn warp(
    points: &[Point],
    target: Point,
    delta: Vec2,
    strength: f64,
    radius: f64,
    falloff: Falloff,
) -> Vec<Point> {
    points
        .iter()
        .map(|&p| {
            let d = distance(p, target);
            if radius <= 0.0 || !(d < radius) {
                return p;
            }
            p + delta * (strength * falloff.weight(d, radius))
        })
        .collect()
}
