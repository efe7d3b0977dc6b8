//! Cubic smoothing splines.
//!
//! [`SmoothingSpline`] fits a natural cubic spline to scalar samples such that the
//! sum of squared residuals stays within a caller-supplied budget while the
//! curvature integral `∫ f''²` is as small as possible (Reinsch's formulation).
//! A budget of zero reproduces the samples exactly.
//!
//! [`VectorSpline`] owns one scalar spline per axis and stacks their values into
//! points. It implements [`Curve3`] over the interior of its knot range: the
//! outermost knots only pad the boundary.

use super::core::{Point3, Tolerance, Vec3};
use super::curve::{Curve3, evaluate_curve_points};

/// Residual budget per fitted point used when none is given explicitly.
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 1.5;

/// A cubic needs `degree + 1` points.
pub const MIN_SPLINE_POINTS: usize = 4;

/// Search range for the smoothing weight, in decades relative to `h³`.
const LOG_WEIGHT_MIN: f64 = -12.0;
const LOG_WEIGHT_MAX: f64 = 12.0;
const MAX_WEIGHT_BISECTIONS: usize = 200;

const PIVOT_EPSILON: f64 = 1e-14;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    #[error("cubic spline requires at least {required} points, got {count}")]
    TooFewPoints { count: usize, required: usize },
    #[error("parameter and value lists must have the same length")]
    LengthMismatch,
    #[error("spline parameters must be strictly increasing")]
    NonIncreasingParameters,
    #[error("spline inputs must be finite")]
    NonFiniteInput,
    #[error("smoothing budget must be finite and >= 0")]
    InvalidSmoothing,
    #[error("singular system while fitting spline")]
    SingularSystem,
}

// ─────────────────────────────────────────────────────────────────────────────
// SmoothingSpline
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingSpline {
    knots: Vec<f64>,
    /// Fitted values at the knots.
    values: Vec<f64>,
    /// Second derivatives at the knots; zero at both ends (natural spline).
    curvatures: Vec<f64>,
    weight: f64,
    residual: f64,
}

struct WeightedSolution {
    curvatures: Vec<f64>,
    residuals: Vec<f64>,
    rss: f64,
}

impl SmoothingSpline {
    /// Fits `y(x)` with a residual budget `budget = Σ (f(x_i) - y_i)²`.
    ///
    /// When even a straight line fits within the budget, the result is the
    /// (numerically) least-squares line.
    pub fn fit(x: &[f64], y: &[f64], budget: f64) -> Result<Self, SplineError> {
        if x.len() != y.len() {
            return Err(SplineError::LengthMismatch);
        }
        if x.len() < MIN_SPLINE_POINTS {
            return Err(SplineError::TooFewPoints {
                count: x.len(),
                required: MIN_SPLINE_POINTS,
            });
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(SplineError::NonFiniteInput);
        }
        if !budget.is_finite() || budget < 0.0 {
            return Err(SplineError::InvalidSmoothing);
        }

        let spacing: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        if spacing.iter().any(|&h| h <= 0.0) {
            return Err(SplineError::NonIncreasingParameters);
        }

        let system = PenaltySystem::new(&spacing, y);

        let (weight, solution) = if budget == 0.0 {
            (0.0, system.solve(0.0)?)
        } else {
            let mean_h = (x[x.len() - 1] - x[0]) / spacing.len() as f64;
            system.solve_for_budget(budget, mean_h.powi(3))?
        };

        let values: Vec<f64> = y
            .iter()
            .zip(&solution.residuals)
            .map(|(yi, ei)| yi - ei)
            .collect();

        let mut curvatures = Vec::with_capacity(x.len());
        curvatures.push(0.0);
        curvatures.extend_from_slice(&solution.curvatures);
        curvatures.push(0.0);

        Ok(Self {
            knots: x.to_vec(),
            values,
            curvatures,
            weight,
            residual: solution.rss,
        })
    }

    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Fitted values at the knots.
    #[must_use]
    pub fn fitted_values(&self) -> &[f64] {
        &self.values
    }

    /// Sum of squared residuals actually achieved.
    #[must_use]
    pub const fn residual_sum_of_squares(&self) -> f64 {
        self.residual
    }

    /// Roughness penalty weight the fit settled on (0 for interpolation).
    #[must_use]
    pub const fn smoothing_weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub fn value_at(&self, t: f64) -> f64 {
        let piece = self.piece(t);
        let (a, b) = piece.offsets(t);
        (piece.m0 * a * a * a + piece.m1 * b * b * b) / (6.0 * piece.h)
            + piece.c0 * a
            + piece.c1 * b
    }

    #[must_use]
    pub fn derivative_at(&self, t: f64) -> f64 {
        let piece = self.piece(t);
        let (a, b) = piece.offsets(t);
        (piece.m1 * b * b - piece.m0 * a * a) / (2.0 * piece.h) - piece.c0 + piece.c1
    }

    #[must_use]
    pub fn second_derivative_at(&self, t: f64) -> f64 {
        let piece = self.piece(t);
        let (a, b) = piece.offsets(t);
        (piece.m0 * a + piece.m1 * b) / piece.h
    }

    /// Cubic piece covering `t`; outside the knots the end pieces extend.
    fn piece(&self, t: f64) -> Piece {
        let last = self.knots.len() - 2;
        let i = self
            .knots
            .partition_point(|&k| k <= t)
            .saturating_sub(1)
            .min(last);
        let h = self.knots[i + 1] - self.knots[i];
        let m0 = self.curvatures[i];
        let m1 = self.curvatures[i + 1];
        Piece {
            x0: self.knots[i],
            x1: self.knots[i + 1],
            h,
            m0,
            m1,
            c0: self.values[i] / h - m0 * h / 6.0,
            c1: self.values[i + 1] / h - m1 * h / 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Piece {
    x0: f64,
    x1: f64,
    h: f64,
    m0: f64,
    m1: f64,
    c0: f64,
    c1: f64,
}

impl Piece {
    fn offsets(self, t: f64) -> (f64, f64) {
        (self.x1 - t, t - self.x0)
    }
}

/// The banded matrices of the penalized least-squares problem.
///
/// With interior second derivatives `γ`, the fit solves
/// `(R + α QᵀQ) γ = Qᵀ y` and the residuals are `α Q γ`.
struct PenaltySystem {
    /// `Q`, one column per interior knot (n × (n − 2)).
    q: Vec<Vec<f64>>,
    /// `R`, tridiagonal, (n − 2) × (n − 2).
    r: Vec<Vec<f64>>,
    qtq: Vec<Vec<f64>>,
    qty: Vec<f64>,
}

impl PenaltySystem {
    fn new(spacing: &[f64], y: &[f64]) -> Self {
        let n = y.len();
        let k = n - 2;

        let mut q = vec![vec![0.0; k]; n];
        let mut r = vec![vec![0.0; k]; k];
        for c in 0..k {
            let j = c + 1;
            let left = spacing[j - 1];
            let right = spacing[j];
            q[j - 1][c] = 1.0 / left;
            q[j][c] = -1.0 / left - 1.0 / right;
            q[j + 1][c] = 1.0 / right;

            r[c][c] = (left + right) / 3.0;
            if c + 1 < k {
                r[c][c + 1] = right / 6.0;
                r[c + 1][c] = right / 6.0;
            }
        }

        let mut qtq = vec![vec![0.0; k]; k];
        for a in 0..k {
            for b in a..k {
                // Q columns only overlap within three rows.
                let lo = a;
                let hi = (a + 3).min(n);
                let dot: f64 = (lo..hi).map(|row| q[row][a] * q[row][b]).sum();
                qtq[a][b] = dot;
                qtq[b][a] = dot;
            }
        }

        let qty = (0..k)
            .map(|c| (c..c + 3).map(|row| q[row][c] * y[row]).sum())
            .collect();

        Self { q, r, qtq, qty }
    }

    fn solve(&self, weight: f64) -> Result<WeightedSolution, SplineError> {
        let matrix: Vec<Vec<f64>> = self
            .r
            .iter()
            .zip(&self.qtq)
            .map(|(r_row, qtq_row)| {
                r_row
                    .iter()
                    .zip(qtq_row)
                    .map(|(r, qtq)| r + weight * qtq)
                    .collect()
            })
            .collect();

        let curvatures = solve_linear_system(&matrix, &self.qty)?;
        let residuals: Vec<f64> = self
            .q
            .iter()
            .map(|row| weight * row.iter().zip(&curvatures).map(|(a, b)| a * b).sum::<f64>())
            .collect();
        let rss = residuals.iter().map(|e| e * e).sum();

        Ok(WeightedSolution {
            curvatures,
            residuals,
            rss,
        })
    }

    /// Bisects `log10(α)` until the residual meets `budget`; the residual grows
    /// monotonically with `α`.
    fn solve_for_budget(
        &self,
        budget: f64,
        scale: f64,
    ) -> Result<(f64, WeightedSolution), SplineError> {
        let weight_at = |log_weight: f64| 10f64.powf(log_weight) * scale;

        let stiffest = weight_at(LOG_WEIGHT_MAX);
        let solution = self.solve(stiffest)?;
        if solution.rss <= budget {
            return Ok((stiffest, solution));
        }

        let target = Tolerance::LOOSE.scaled(budget);
        let mut lo = LOG_WEIGHT_MIN;
        let mut hi = LOG_WEIGHT_MAX;
        let mut best = (weight_at(lo), self.solve(weight_at(lo))?);

        for _ in 0..MAX_WEIGHT_BISECTIONS {
            let mid = 0.5 * (lo + hi);
            let weight = weight_at(mid);
            let solution = self.solve(weight)?;
            let within = solution.rss <= budget;
            let converged = target.approx_eq_f64(solution.rss, budget);
            if within {
                lo = mid;
                best = (weight, solution);
            } else {
                hi = mid;
            }
            if converged || hi - lo < f64::EPSILON {
                break;
            }
        }

        Ok(best)
    }
}

/// Solves a dense linear system Ax = b using Gaussian elimination with partial pivoting.
fn solve_linear_system(matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>, SplineError> {
    let n = matrix.len();
    if n == 0 || rhs.len() != n {
        return Err(SplineError::LengthMismatch);
    }

    let mut aug: Vec<Vec<f64>> = matrix
        .iter()
        .zip(rhs)
        .map(|(row, &b)| {
            let mut r = row.clone();
            r.push(b);
            r
        })
        .collect();

    for k in 0..n {
        let mut max_row = k;
        let mut max_val = aug[k][k].abs();
        for (i, row) in aug.iter().enumerate().skip(k + 1) {
            if row[k].abs() > max_val {
                max_val = row[k].abs();
                max_row = i;
            }
        }

        if max_val < PIVOT_EPSILON {
            return Err(SplineError::SingularSystem);
        }

        if max_row != k {
            aug.swap(k, max_row);
        }

        let pivot_row = aug[k].clone();
        for row in aug.iter_mut().skip(k + 1) {
            let factor = row[k] / pivot_row[k];
            if factor == 0.0 {
                continue;
            }
            for (j, value) in row.iter_mut().enumerate().skip(k) {
                *value -= factor * pivot_row[j];
            }
        }
    }

    let mut result = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = aug[i][n];
        for j in (i + 1)..n {
            sum -= aug[i][j] * result[j];
        }
        if aug[i][i].abs() < PIVOT_EPSILON {
            return Err(SplineError::SingularSystem);
        }
        result[i] = sum / aug[i][i];
    }

    Ok(result)
}

// ─────────────────────────────────────────────────────────────────────────────
// VectorSpline
// ─────────────────────────────────────────────────────────────────────────────

/// Three independent [`SmoothingSpline`]s sharing one parameter axis.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSpline {
    x: SmoothingSpline,
    y: SmoothingSpline,
    z: SmoothingSpline,
}

impl VectorSpline {
    /// Fits each axis of `points` against `parameters` with the same residual budget.
    pub fn fit(parameters: &[f64], points: &[Point3], budget: f64) -> Result<Self, SplineError> {
        if parameters.len() != points.len() {
            return Err(SplineError::LengthMismatch);
        }
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        let zs: Vec<f64> = points.iter().map(|p| p.z).collect();

        let (x, y, z) = fit_axes(parameters, &xs, &ys, &zs, budget);
        Ok(Self {
            x: x?,
            y: y?,
            z: z?,
        })
    }

    /// Fits `points` against their indices `0..m`, with a residual budget of
    /// `smoothing_factor × m` so larger point sets tolerate proportionally more
    /// smoothing.
    pub fn fit_indexed(points: &[Point3], smoothing_factor: f64) -> Result<Self, SplineError> {
        if !smoothing_factor.is_finite() || smoothing_factor < 0.0 {
            return Err(SplineError::InvalidSmoothing);
        }
        let parameters: Vec<f64> = (0..points.len()).map(|i| i as f64).collect();
        Self::fit(&parameters, points, smoothing_factor * points.len() as f64)
    }

    /// Evaluates the curve at each parameter, stacking the three axes.
    #[must_use]
    pub fn evaluate(&self, parameters: &[f64]) -> Vec<Point3> {
        evaluate_curve_points(self, parameters)
    }

    #[must_use]
    pub const fn axes(&self) -> [&SmoothingSpline; 3] {
        [&self.x, &self.y, &self.z]
    }

    /// Total squared residual over all three axes.
    #[must_use]
    pub fn residual_sum_of_squares(&self) -> f64 {
        self.axes()
            .iter()
            .map(|axis| axis.residual_sum_of_squares())
            .sum()
    }
}

impl Curve3 for VectorSpline {
    fn point_at(&self, t: f64) -> Point3 {
        Point3::new(self.x.value_at(t), self.y.value_at(t), self.z.value_at(t))
    }

    /// Second knot to second-to-last knot.
    fn domain(&self) -> (f64, f64) {
        let knots = self.x.knots();
        (knots[1], knots[knots.len() - 2])
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        Vec3::new(
            self.x.derivative_at(t),
            self.y.derivative_at(t),
            self.z.derivative_at(t),
        )
    }
}

type AxisFit = Result<SmoothingSpline, SplineError>;

#[cfg(feature = "parallel")]
fn fit_axes(t: &[f64], xs: &[f64], ys: &[f64], zs: &[f64], budget: f64) -> (AxisFit, AxisFit, AxisFit) {
    let (x, (y, z)) = rayon::join(
        || SmoothingSpline::fit(t, xs, budget),
        || {
            rayon::join(
                || SmoothingSpline::fit(t, ys, budget),
                || SmoothingSpline::fit(t, zs, budget),
            )
        },
    );
    (x, y, z)
}

#[cfg(not(feature = "parallel"))]
fn fit_axes(t: &[f64], xs: &[f64], ys: &[f64], zs: &[f64], budget: f64) -> (AxisFit, AxisFit, AxisFit) {
    (
        SmoothingSpline::fit(t, xs, budget),
        SmoothingSpline::fit(t, ys, budget),
        SmoothingSpline::fit(t, zs, budget),
    )
}
