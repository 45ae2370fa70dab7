//! Parametric smoothing spline fit.
//!
//! With a zero smoothing factor the spline interpolates every point, with
//! knots at the data parameters. Otherwise knots are added where the
//! residual is largest until the squared residual `fp` drops below
//! the smoothing factor, and a penalty on the jumps of the top derivative at
//! the interior knots is then tuned so `fp` lands on the smoothing factor.

use kurbo::Point;
use nalgebra::DMatrix;
use tracing::debug;

use super::bspline::{basis_funs, find_span, top_derivative, SplineRepresentation};
use crate::error::BrushError;

/// Singular values below this are treated as zero by the least-squares solve.
const SVD_EPS: f64 = 1e-12;

/// Relative tolerance on `fp` against the smoothing factor.
const FP_TOLERANCE: f64 = 1e-3;

/// Cap on penalty bracketing and bisection steps.
const MAX_PENALTY_STEPS: usize = 60;

/// A solved spline and its residuals at the data parameters.
#[derive(Debug, Clone)]
pub(crate) struct Solved {
    pub spline: SplineRepresentation,
    pub residuals: Vec<f64>,
    pub fp: f64,
}

/// Normalized cumulative chord length, from 0 to exactly 1.
///
/// Consecutive points must be distinct.
pub(crate) fn parametrize(points: &[Point]) -> Vec<f64> {
    let mut u = Vec::with_capacity(points.len());
    let mut total = 0.0;
    u.push(0.0);
    for w in points.windows(2) {
        total += w[0].distance(w[1]);
        u.push(total);
    }
    if total > 0.0 {
        for value in &mut u {
            *value /= total;
        }
    }
    if let Some(last) = u.last_mut() {
        *last = 1.0;
    }
    u
}

/// Fit a spline of `degree` to `points` at parameters `u`.
pub(crate) fn fit_spline(
    points: &[Point],
    u: &[f64],
    degree: usize,
    smoothing: f64,
) -> Result<Solved, BrushError> {
    if smoothing.is_nan() || smoothing <= 0.0 {
        let knots = interpolation_knots(u, degree);
        return solve(points, u, knots, degree, None);
    }

    let max_interior = points.len() - degree - 1;
    let mut interior: Vec<f64> = Vec::new();
    let solved = loop {
        let at_max = interior.len() >= max_interior;
        let knots = if at_max {
            interpolation_knots(u, degree)
        } else {
            clamped_knots(&interior, degree)
        };
        let solved = solve(points, u, knots, degree, None)?;
        if at_max || solved.fp <= smoothing {
            break solved;
        }
        match next_knot(&solved.spline, u, &solved.residuals) {
            Some(x) => {
                let at = interior.partition_point(|&t| t < x);
                interior.insert(at, x);
            }
            None => break solved,
        }
    };
    debug!(
        knots = solved.spline.knots.len(),
        fp = solved.fp,
        smoothing,
        "least-squares knots placed"
    );

    if solved.fp >= smoothing || solved.spline.breakpoints().len() <= 2 {
        return Ok(solved);
    }
    tune_penalty(points, u, solved, smoothing)
}

/// Raise the derivative-jump penalty until `fp` meets the smoothing factor.
fn tune_penalty(
    points: &[Point],
    u: &[f64],
    unpenalized: Solved,
    smoothing: f64,
) -> Result<Solved, BrushError> {
    let degree = unpenalized.spline.degree;
    let knots = unpenalized.spline.knots.clone();
    let n_coeffs = unpenalized.spline.coeffs.len();
    let jumps = derivative_jumps(&knots, degree, n_coeffs);
    let jump_scale = jumps.norm_squared();
    if jump_scale == 0.0 {
        return Ok(unpenalized);
    }
    let collocation_scale = collocation(&knots, degree, u).norm_squared();

    let eval = |lambda: f64| solve(points, u, knots.clone(), degree, Some((&jumps, lambda)));

    // Bracket: fp(lo) <= s < fp(hi).
    let mut lo = collocation_scale / jump_scale;
    let mut hi;
    let mut best = eval(lo)?;
    if best.fp > smoothing {
        hi = lo;
        let mut found = false;
        for _ in 0..MAX_PENALTY_STEPS {
            lo /= 10.0;
            best = eval(lo)?;
            if best.fp <= smoothing {
                found = true;
                break;
            }
        }
        if !found {
            return Ok(unpenalized);
        }
    } else {
        hi = lo;
        let mut found = false;
        for _ in 0..MAX_PENALTY_STEPS {
            hi *= 10.0;
            let trial = eval(hi)?;
            if trial.fp > smoothing {
                found = true;
                break;
            }
            lo = hi;
            best = trial;
        }
        if !found {
            return Ok(best);
        }
    }

    for _ in 0..MAX_PENALTY_STEPS {
        let mid = (lo * hi).sqrt();
        let trial = eval(mid)?;
        if (trial.fp - smoothing).abs() <= FP_TOLERANCE * smoothing {
            return Ok(trial);
        }
        if trial.fp > smoothing {
            hi = mid;
        } else {
            lo = mid;
            best = trial;
        }
    }
    Ok(best)
}

/// Knot vector with `degree + 1` clamped ends around `interior`.
fn clamped_knots(interior: &[f64], degree: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(interior.len() + 2 * (degree + 1));
    knots.extend(std::iter::repeat(0.0).take(degree + 1));
    knots.extend_from_slice(interior);
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

/// Knots giving one coefficient per data point.
///
/// Odd degrees put interior knots on data parameters, even degrees on
/// midpoints between them.
pub(crate) fn interpolation_knots(u: &[f64], degree: usize) -> Vec<f64> {
    let count = u.len() - degree - 1;
    let half = degree / 2;
    let interior: Vec<f64> = if degree % 2 == 1 {
        u[half + 1..half + 1 + count].to_vec()
    } else {
        (0..count)
            .map(|i| 0.5 * (u[i + half] + u[i + half + 1]))
            .collect()
    };
    clamped_knots(&interior, degree)
}

/// New knot for the span with the largest residual sum.
///
/// Only spans holding a data parameter strictly inside them qualify; the
/// knot goes on the median such parameter.
fn next_knot(spline: &SplineRepresentation, u: &[f64], residuals: &[f64]) -> Option<f64> {
    let breaks = spline.breakpoints();
    let mut best: Option<(f64, f64)> = None;
    for w in breaks.windows(2) {
        let (a, b) = (w[0], w[1]);
        let inside: Vec<usize> = (0..u.len()).filter(|&i| u[i] > a && u[i] < b).collect();
        if inside.is_empty() {
            continue;
        }
        let score: f64 = (0..u.len())
            .filter(|&i| u[i] >= a && u[i] <= b)
            .map(|i| residuals[i])
            .sum();
        let knot = u[inside[(inside.len() - 1) / 2]];
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, knot));
        }
    }
    best.map(|(_, knot)| knot)
}

/// Basis values of every data parameter: one row per point.
fn collocation(knots: &[f64], degree: usize, u: &[f64]) -> DMatrix<f64> {
    let n_coeffs = knots.len() - degree - 1;
    let mut a = DMatrix::<f64>::zeros(u.len(), n_coeffs);
    for (row, &ui) in u.iter().enumerate() {
        let span = find_span(knots, degree, n_coeffs, ui);
        for (j, b) in basis_funs(knots, span, ui, degree).into_iter().enumerate() {
            a[(row, span - degree + j)] = b;
        }
    }
    a
}

/// Jump of the top derivative across each distinct interior knot, as a
/// linear map on the coefficients.
fn derivative_jumps(knots: &[f64], degree: usize, n_coeffs: usize) -> DMatrix<f64> {
    let rows: Vec<usize> = (degree + 1..n_coeffs)
        .filter(|&q| knots[q] > knots[q - 1])
        .collect();
    let mut d = DMatrix::<f64>::zeros(rows.len(), n_coeffs);
    for (r, &q) in rows.iter().enumerate() {
        for j in 0..n_coeffs {
            d[(r, j)] = top_derivative(knots, j, degree, q) - top_derivative(knots, j, degree, q - 1);
        }
    }
    d
}

/// Least-squares solve for the coefficients, optionally with the jump
/// penalty `lambda * |D c|^2` added.
fn solve(
    points: &[Point],
    u: &[f64],
    knots: Vec<f64>,
    degree: usize,
    penalty: Option<(&DMatrix<f64>, f64)>,
) -> Result<Solved, BrushError> {
    let a = collocation(&knots, degree, u);
    let m = points.len();
    let n_coeffs = a.ncols();

    let extra = penalty.map_or(0, |(d, _)| d.nrows());
    let mut system = DMatrix::<f64>::zeros(m + extra, n_coeffs);
    let mut rhs = DMatrix::<f64>::zeros(m + extra, 2);
    system.rows_mut(0, m).copy_from(&a);
    for (i, p) in points.iter().enumerate() {
        rhs[(i, 0)] = p.x;
        rhs[(i, 1)] = p.y;
    }
    if let Some((d, lambda)) = penalty {
        system.rows_mut(m, extra).copy_from(&(d * lambda.sqrt()));
    }

    let coeffs = system
        .svd(true, true)
        .solve(&rhs, SVD_EPS)
        .map_err(|_| BrushError::SingularFit)?;
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(BrushError::SingularFit);
    }

    let fitted = &a * &coeffs;
    let residuals: Vec<f64> = (0..m)
        .map(|i| (fitted[(i, 0)] - rhs[(i, 0)]).powi(2) + (fitted[(i, 1)] - rhs[(i, 1)]).powi(2))
        .collect();
    let fp = residuals.iter().sum();

    let spline = SplineRepresentation {
        knots,
        coeffs: (0..n_coeffs)
            .map(|j| Point::new(coeffs[(j, 0)], coeffs[(j, 1)]))
            .collect(),
        degree,
    };
    Ok(Solved {
        spline,
        residuals,
        fp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let x = i as f64 * 4.0;
                Point::new(x, 20.0 * (x / 25.0).sin() + if i % 2 == 0 { 1.5 } else { -1.5 })
            })
            .collect()
    }

    #[test]
    fn parametrize_is_normalized_chord_length() {
        let pts = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(3.0, 9.0)];
        let u = parametrize(&pts);
        assert_eq!(u, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn interpolation_knot_counts() {
        let u: Vec<f64> = (0..7).map(|i| i as f64 / 6.0).collect();
        assert_eq!(interpolation_knots(&u, 3).len(), 7 + 4);
        assert_eq!(interpolation_knots(&u[..3], 2).len(), 3 + 3);
    }

    #[test]
    fn zero_smoothing_interpolates() {
        let pts = wave(12);
        let u = parametrize(&pts);
        let solved = fit_spline(&pts, &u, 3, 0.0).unwrap();
        assert!(solved.fp < 1e-12);
        for (p, &ui) in pts.iter().zip(&u) {
            assert!(solved.spline.eval(ui).distance(*p) < 1e-6);
        }
    }

    #[test]
    fn smoothing_meets_factor() {
        let pts = wave(40);
        let u = parametrize(&pts);
        let s = 150.0;
        let solved = fit_spline(&pts, &u, 3, s).unwrap();
        assert!(solved.fp <= s * (1.0 + FP_TOLERANCE) + 1e-9, "fp={}", solved.fp);
        assert!(solved.spline.coeffs.len() < pts.len());
    }

    #[test]
    fn huge_smoothing_gives_single_polynomial() {
        let pts = wave(20);
        let u = parametrize(&pts);
        let solved = fit_spline(&pts, &u, 3, 1e9).unwrap();
        assert_eq!(solved.spline.coeffs.len(), 4);
        assert_eq!(solved.spline.bezier_segments().len(), 1);
    }

    #[test]
    fn jump_matrix_has_row_per_interior_knot() {
        let knots = clamped_knots(&[0.25, 0.5, 0.75], 3);
        let d = derivative_jumps(&knots, 3, knots.len() - 4);
        assert_eq!(d.nrows(), 3);
        // A single cubic polynomial has no jumps: all-ones coefficients
        // reproduce the constant 1.
        let ones = DMatrix::from_element(d.ncols(), 1, 1.0);
        assert!((&d * ones).norm() < 1e-6);
    }
}
