use super::core::{Point3, Tolerance, Vec3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn derivative_at(&self, t: f64) -> Vec3 {
        let (a, b) = self.domain();
        let span = b - a;
        if !span.is_finite() || span == 0.0 {
            return Vec3::ZERO;
        }

        let h = Tolerance::DERIVATIVE.relative_to(span);
        if !h.is_finite() || h == 0.0 {
            return Vec3::ZERO;
        }

        let t0 = (t - h).max(a);
        let t1 = (t + h).min(b);
        if t1 == t0 {
            return Vec3::ZERO;
        }

        let p0 = self.point_at(t0);
        let p1 = self.point_at(t1);
        p1.sub_point(p0).mul_scalar(1.0 / (t1 - t0))
    }

    /// Returns the unit tangent vector at parameter `t`.
    /// Returns `None` if the derivative is zero or degenerate.
    #[must_use]
    fn tangent_at(&self, t: f64) -> Option<Vec3> {
        self.derivative_at(t).normalized()
    }
}

/// `count` parameters spaced evenly over `[t0, t1]`, both ends included.
///
/// A single sample sits at `t0`; zero samples yields an empty list.
#[must_use]
pub fn uniform_parameters(t0: f64, t1: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![t0],
        _ => {
            let last = (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i + 1 == count {
                        t1
                    } else {
                        t0 + (t1 - t0) * (i as f64 / last)
                    }
                })
                .collect()
        }
    }
}

/// Evaluates `curve` at `samples` evenly spaced parameters across its domain.
///
/// Returns the parameters alongside the points so callers can re-evaluate
/// derivatives at the same locations.
#[must_use]
pub fn tessellate_curve_uniform<C>(curve: &C, samples: usize) -> (Vec<f64>, Vec<Point3>)
where
    C: Curve3 + Sync + ?Sized,
{
    let (t0, t1) = curve.domain();
    let parameters = uniform_parameters(t0, t1, samples);
    let points = evaluate_curve_points(curve, &parameters);
    (parameters, points)
}

/// Evaluates `curve` at each parameter, in order.
#[cfg(feature = "parallel")]
pub fn evaluate_curve_points<C>(curve: &C, parameters: &[f64]) -> Vec<Point3>
where
    C: Curve3 + Sync + ?Sized,
{
    parameters.par_iter().map(|&t| curve.point_at(t)).collect()
}

/// Evaluates `curve` at each parameter, in order.
#[cfg(not(feature = "parallel"))]
pub fn evaluate_curve_points<C>(curve: &C, parameters: &[f64]) -> Vec<Point3>
where
    C: Curve3 + Sync + ?Sized,
{
    parameters.iter().map(|&t| curve.point_at(t)).collect()
}
