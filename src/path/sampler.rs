//! Fine resampling of the fitted curve and travel-time frame selection.

use super::fields::SpeedField;
use super::{PathError, StepStage};
use crate::geom::{Curve3, Point3, Tolerance, Vec3, tessellate_curve_uniform, uniform_parameters};

/// Dense polyline along a curve, parametrized by travel time.
///
/// Each segment's travel time is its length divided by the mean speed of its two
/// endpoints, so frames spaced evenly in travel time bunch up where the speed
/// field is slow.
#[derive(Debug, Clone, PartialEq)]
pub struct FineCurve {
    parameters: Vec<f64>,
    points: Vec<Point3>,
    segments: Vec<Vec3>,
    speeds: Vec<f64>,
    travel_steps: Vec<f64>,
    travel_length: Vec<f64>,
}

impl FineCurve {
    /// Samples `curve` at `samples` evenly spaced parameters over its domain.
    pub fn sample<C>(curve: &C, samples: usize, speed: &SpeedField) -> Result<Self, PathError>
    where
        C: Curve3 + Sync + ?Sized,
    {
        if samples < 2 {
            return Err(PathError::InvalidParameter {
                name: "fine_samples",
                reason: "at least two samples are required",
            });
        }
        let (parameters, points) = tessellate_curve_uniform(curve, samples);
        Self::from_points(parameters, points, speed)
    }

    /// Builds the travel-time parametrization of an explicit polyline.
    ///
    /// # Errors
    /// [`PathError::DegenerateStep`] when two consecutive samples coincide.
    pub fn from_points(
        parameters: Vec<f64>,
        points: Vec<Point3>,
        speed: &SpeedField,
    ) -> Result<Self, PathError> {
        if points.is_empty() {
            return Err(PathError::EmptyCurve);
        }
        if parameters.len() != points.len() {
            return Err(PathError::InvalidParameter {
                name: "parameters",
                reason: "must match the number of points",
            });
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(PathError::NonFiniteInput);
        }

        let point_speeds: Vec<f64> = points.iter().map(|p| speed.speed_at(*p)).collect();
        let segments: Vec<Vec3> = points.windows(2).map(|w| w[1] - w[0]).collect();
        let speeds: Vec<f64> = point_speeds.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();

        let travel_steps = segments
            .iter()
            .zip(&speeds)
            .enumerate()
            .map(|(index, (segment, v))| {
                let step = segment.length() / v;
                if step.is_finite() && !Tolerance::ZERO_LENGTH.approx_zero_f64(step) {
                    Ok(step)
                } else {
                    Err(PathError::DegenerateStep {
                        stage: StepStage::FineCurve,
                        index,
                    })
                }
            })
            .collect::<Result<Vec<f64>, PathError>>()?;

        let mut travel_length = Vec::with_capacity(points.len());
        travel_length.push(0.0);
        let mut total = 0.0;
        for step in &travel_steps {
            total += step;
            travel_length.push(total);
        }

        Ok(Self {
            parameters,
            points,
            segments,
            speeds,
            travel_steps,
            travel_length,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// `points[i + 1] - points[i]`.
    #[must_use]
    pub fn segments(&self) -> &[Vec3] {
        &self.segments
    }

    /// Mean speed over each segment.
    #[must_use]
    pub fn segment_speeds(&self) -> &[f64] {
        &self.speeds
    }

    /// Travel time of each segment, all strictly positive.
    #[must_use]
    pub fn travel_steps(&self) -> &[f64] {
        &self.travel_steps
    }

    /// Cumulative travel time at each sample, starting at 0.
    #[must_use]
    pub fn travel_length(&self) -> &[f64] {
        &self.travel_length
    }

    #[must_use]
    pub fn total_travel(&self) -> f64 {
        self.travel_length.last().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn geometric_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length()).sum()
    }

    /// Slowest and fastest segment speeds, or `None` for a single-sample curve.
    #[must_use]
    pub fn speed_range(&self) -> Option<(f64, f64)> {
        self.speeds.iter().fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Unit tangent at each sample: the normalized sum of the adjacent
    /// segments, or the single adjacent segment at the ends.
    ///
    /// Where the two neighbours cancel exactly (a cusp) the outgoing segment is
    /// used instead.
    pub fn tangents(&self) -> Result<Vec<Vec3>, PathError> {
        let n = self.points.len();
        if n < 2 {
            return Err(PathError::EmptyCurve);
        }
        (0..n)
            .map(|i| {
                let incoming = i.checked_sub(1).map(|j| self.segments[j]);
                let outgoing = self.segments.get(i).copied();
                let sum = incoming.unwrap_or(Vec3::ZERO) + outgoing.unwrap_or(Vec3::ZERO);
                sum.normalized()
                    .or_else(|| outgoing.and_then(Vec3::normalized))
                    .or_else(|| incoming.and_then(Vec3::normalized))
                    .ok_or(PathError::CollapsedDirection { index: i })
            })
            .collect()
    }
}

/// Indices of `n_frames` samples spaced evenly in travel time.
///
/// Each target `t_k = k · total / (n_frames - 1)` maps to the first sample whose
/// cumulative travel reaches it. One frame yields index 0.
pub fn frame_indices(travel_length: &[f64], n_frames: usize) -> Result<Vec<usize>, PathError> {
    if n_frames == 0 {
        return Err(PathError::InvalidFrameCount {
            requested: 0,
            minimum: 1,
        });
    }
    let Some(&total) = travel_length.last() else {
        return Err(PathError::EmptyCurve);
    };
    let last = travel_length.len() - 1;
    Ok(uniform_parameters(0.0, total, n_frames)
        .into_iter()
        .map(|target| travel_length.partition_point(|&s| s < target).min(last))
        .collect())
}
