//! Length measurement and parametric sampling.
//!
//! A path parameter `t` in [0, 1] picks a segment by cumulative arc length;
//! inside that segment the remaining fraction is used directly as the
//! segment's own curve parameter, so sampling is not arc-length uniform
//! within a cubic.

use kurbo::{CubicBez, Line, ParamCurve, ParamCurveArclen, PathSeg, Point};

use super::{Path, Segment};

/// Absolute accuracy for cubic arc length estimates.
const ARCLEN_ACCURACY: f64 = 1e-4;

/// Precomputed segment lengths for repeated sampling of one path.
#[derive(Debug, Clone)]
pub struct Sampler {
    segments: Vec<PathSeg>,
    lengths: Vec<f64>,
    total: f64,
    start: Point,
}

impl Sampler {
    pub fn new(path: &Path) -> Self {
        let segments = drawable_segments(path);
        let lengths: Vec<f64> = segments
            .iter()
            .map(|seg| seg.arclen(ARCLEN_ACCURACY))
            .collect();
        let total = lengths.iter().sum();
        Self {
            segments,
            lengths,
            total,
            start: path.start_point().unwrap_or(Point::ZERO),
        }
    }

    pub fn length(&self) -> f64 {
        self.total
    }

    /// Point at parameter `t`, clamped to [0, 1].
    ///
    /// A path without drawable length yields its start point.
    pub fn at(&self, t: f64) -> Point {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if self.total <= 0.0 {
            return self.start;
        }
        let target = t * self.total;
        let mut covered = 0.0;
        for (seg, &len) in self.segments.iter().zip(&self.lengths) {
            if len > 0.0 && covered + len >= target {
                let local = ((target - covered) / len).clamp(0.0, 1.0);
                return seg.eval(local);
            }
            covered += len;
        }
        self.segments
            .last()
            .map(|seg| seg.eval(1.0))
            .unwrap_or(self.start)
    }

    /// `n` points at evenly spaced parameters from 0 to 1 inclusive.
    pub fn uniform(&self, n: usize) -> Vec<Point> {
        match n {
            0 => Vec::new(),
            1 => vec![self.at(0.0)],
            _ => {
                let step = 1.0 / (n - 1) as f64;
                (0..n).map(|i| self.at(i as f64 * step)).collect()
            }
        }
    }
}

impl Path {
    pub fn sampler(&self) -> Sampler {
        Sampler::new(self)
    }

    /// Total arc length; MoveTo jumps do not count.
    pub fn length(&self) -> f64 {
        drawable_segments(self)
            .iter()
            .map(|seg| seg.arclen(ARCLEN_ACCURACY))
            .sum()
    }

    pub fn sample(&self, t: f64) -> Point {
        self.sampler().at(t)
    }

    pub fn sample_n(&self, n: usize) -> Vec<Point> {
        self.sampler().uniform(n)
    }

    /// Rasterize to roughly one point per unit of length (at least two).
    pub fn resample(&self) -> Vec<Point> {
        if self.is_empty() {
            return Vec::new();
        }
        let sampler = self.sampler();
        let n = (sampler.length().round() as usize).max(2);
        sampler.uniform(n)
    }
}

fn drawable_segments(path: &Path) -> Vec<PathSeg> {
    let mut segments = Vec::new();
    let mut current = Point::ZERO;
    for seg in path.segments() {
        match *seg {
            Segment::MoveTo(p) => current = p,
            Segment::LineTo(p) => {
                segments.push(PathSeg::Line(Line::new(current, p)));
                current = p;
            }
            Segment::CubicTo(c1, c2, p) => {
                segments.push(PathSeg::Cubic(CubicBez::new(current, c1, c2, p)));
                current = p;
            }
        }
    }
    segments
}
