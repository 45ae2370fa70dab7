//! Clamped parametric B-spline: evaluation, Boehm knot insertion and
//! decomposition into Bezier control groups.

use kurbo::{Point, Vec2};

/// Knot vector, control coefficients and degree of a parametric spline.
///
/// `knots.len() == coeffs.len() + degree + 1` always holds.
#[derive(Debug, Clone)]
pub(crate) struct SplineRepresentation {
    pub knots: Vec<f64>,
    pub coeffs: Vec<Point>,
    pub degree: usize,
}

impl SplineRepresentation {
    #[cfg(test)]
    pub fn eval(&self, u: f64) -> Point {
        let k = self.degree;
        let span = find_span(&self.knots, k, self.coeffs.len(), u);
        let basis = basis_funs(&self.knots, span, u, k);
        let mut acc = Vec2::ZERO;
        for (j, b) in basis.iter().enumerate() {
            acc += self.coeffs[span - k + j].to_vec2() * *b;
        }
        acc.to_point()
    }

    /// Distinct knot values inside the parameter domain, ends included.
    pub fn breakpoints(&self) -> Vec<f64> {
        let k = self.degree;
        let mut values = self.knots[k..=self.coeffs.len()].to_vec();
        values.dedup();
        values
    }

    /// Insert `x` once. The curve is unchanged; one coefficient is added.
    pub fn insert_knot(&mut self, x: f64) {
        let k = self.degree;
        let n = self.coeffs.len();
        let l = find_span(&self.knots, k, n, x);
        let mut coeffs = Vec::with_capacity(n + 1);
        for i in 0..=n {
            let q = if i + k <= l {
                self.coeffs[i]
            } else if i > l {
                self.coeffs[i - 1]
            } else {
                let denom = self.knots[i + k] - self.knots[i];
                let a = if denom == 0.0 {
                    0.0
                } else {
                    (x - self.knots[i]) / denom
                };
                self.coeffs[i - 1].lerp(self.coeffs[i], a)
            };
            coeffs.push(q);
        }
        self.knots.insert(l + 1, x);
        self.coeffs = coeffs;
    }

    /// Split into Bezier control groups of `degree + 1` points each.
    ///
    /// Every interior knot is raised to a multiplicity that is a multiple of
    /// `degree + 1`, which leaves only positional joins between pieces.
    pub fn bezier_segments(&self) -> Vec<Vec<Point>> {
        let k = self.degree;
        let order = k + 1;
        let mut interior = self.knots[k + 1..self.knots.len() - k - 1].to_vec();
        interior.dedup();

        let mut split = self.clone();
        for x in interior {
            let multiplicity = split.knots.iter().filter(|&&t| t == x).count();
            let remainder = multiplicity % order;
            if remainder != 0 {
                for _ in 0..order - remainder {
                    split.insert_knot(x);
                }
            }
        }

        split
            .coeffs
            .chunks_exact(order)
            .map(<[Point]>::to_vec)
            .collect()
    }
}

/// Index `l` of the knot span holding `u`: `knots[l] <= u < knots[l + 1]`,
/// restricted to the valid spans `degree..n_coeffs`.
pub(crate) fn find_span(knots: &[f64], degree: usize, n_coeffs: usize, u: f64) -> usize {
    if u >= knots[n_coeffs] {
        return n_coeffs - 1;
    }
    if u <= knots[degree] {
        return degree;
    }
    let upper = knots.partition_point(|&t| t <= u);
    upper.saturating_sub(1).clamp(degree, n_coeffs - 1)
}

/// The `degree + 1` non-zero basis values at `u` in span `span`.
pub(crate) fn basis_funs(knots: &[f64], span: usize, u: f64, degree: usize) -> Vec<f64> {
    let mut values = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    values[0] = 1.0;
    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom == 0.0 { 0.0 } else { values[r] / denom };
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }
    values
}

/// The `p`-th derivative of basis function `N(i, p)` on knot span `span`.
///
/// For the top derivative the value is constant across the span.
pub(crate) fn top_derivative(knots: &[f64], i: usize, p: usize, span: usize) -> f64 {
    if p == 0 {
        return if i == span { 1.0 } else { 0.0 };
    }
    let a = knots[i + p] - knots[i];
    let b = knots[i + p + 1] - knots[i + 1];
    let left = if a > 0.0 {
        top_derivative(knots, i, p - 1, span) / a
    } else {
        0.0
    };
    let right = if b > 0.0 {
        top_derivative(knots, i + 1, p - 1, span) / b
    } else {
        0.0
    };
    p as f64 * (left - right)
}
