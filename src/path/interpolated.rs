//! Anchor-driven camera paths.
//!
//! Anchors are padded at both ends, fitted with a smoothing spline against their
//! indices, and the spline's interior is resampled into a [`FineCurve`]. Frames
//! are then spaced evenly in travel time, each facing along the integrated
//! direction field.

use serde::{Deserialize, Serialize};

use super::fields::{AttractorField, SpeedField};
use super::frame::{CameraPath, Frame};
use super::integrator::{DirectionField, DirectionSpring, LoopClosure, integrate_directions};
use super::metrics::{PathMetrics, PathTimingReport, TimingBucket};
use super::sampler::{FineCurve, frame_indices};
use super::{PathError, StepStage};
use crate::geom::{
    DEFAULT_SMOOTHING_FACTOR, MIN_SPLINE_POINTS, Point3, Tolerance, Vec3, VectorSpline,
    directions_to_camera_angles,
};

/// Fine-curve resolution used when none is given.
pub const DEFAULT_FINE_SAMPLES: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolatedPathOptions {
    pub spring: DirectionSpring,
    pub attractor: AttractorField,
    pub speed: SpeedField,
    pub closure: LoopClosure,
    /// Residual budget per spline point; 0 interpolates the anchors exactly.
    pub smoothing_factor: f64,
    pub fine_samples: usize,
}

impl Default for InterpolatedPathOptions {
    fn default() -> Self {
        Self {
            spring: DirectionSpring::default(),
            attractor: AttractorField::default(),
            speed: SpeedField::default(),
            closure: LoopClosure::default(),
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            fine_samples: DEFAULT_FINE_SAMPLES,
        }
    }
}

impl InterpolatedPathOptions {
    #[must_use]
    pub const fn with_closure(mut self, closure: LoopClosure) -> Self {
        self.closure = closure;
        self
    }

    #[must_use]
    pub const fn with_fine_samples(mut self, fine_samples: usize) -> Self {
        self.fine_samples = fine_samples;
        self
    }

    #[must_use]
    pub const fn with_smoothing_factor(mut self, smoothing_factor: f64) -> Self {
        self.smoothing_factor = smoothing_factor;
        self
    }

    pub fn validate(&self) -> Result<(), PathError> {
        self.spring.validate()?;
        self.attractor.validate()?;
        self.speed.validate()?;
        self.closure.validate()?;
        if !self.smoothing_factor.is_finite() || self.smoothing_factor < 0.0 {
            return Err(PathError::InvalidParameter {
                name: "smoothing_factor",
                reason: "must be finite and >= 0",
            });
        }
        if self.fine_samples < 2 {
            return Err(PathError::InvalidParameter {
                name: "fine_samples",
                reason: "at least two samples are required",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathDiagnostics {
    pub anchor_count: usize,
    /// Anchors after closing and padding.
    pub spline_point_count: usize,
    pub fine_sample_count: usize,
    pub spline_residual: f64,
    pub geometric_length: f64,
    pub travel_length: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub closure_start: Option<usize>,
    pub max_norm_error: f64,
    pub frame_count: usize,
    pub timing: Option<PathTimingReport>,
}

/// Pads anchors for fitting.
///
/// Closed paths first repeat the opening anchor at the end. One point is then
/// mirrored before the start (`first - (second - first)`) and one after the end
/// (`last + (last - previous)`), so the spline's interior covers every anchor.
///
/// # Errors
/// [`PathError::InsufficientAnchors`] for fewer than two anchors and
/// [`PathError::DegenerateStep`] when consecutive anchors coincide.
pub fn extend_anchors(anchors: &[Point3], closed: bool) -> Result<Vec<Point3>, PathError> {
    if anchors.len() < 2 {
        return Err(PathError::InsufficientAnchors {
            count: anchors.len(),
        });
    }
    if anchors.iter().any(|p| !p.is_finite()) {
        return Err(PathError::NonFiniteInput);
    }

    let mut points = anchors.to_vec();
    if closed {
        points.push(anchors[0]);
    }

    if let Some(index) = points
        .windows(2)
        .position(|w| Tolerance::ZERO_LENGTH.approx_eq_point3(w[0], w[1]))
    {
        return Err(PathError::DegenerateStep {
            stage: StepStage::Anchor,
            index: index + 1,
        });
    }

    let first = points[0];
    let second = points[1];
    let last = points[points.len() - 1];
    let previous = points[points.len() - 2];

    let mut extended = Vec::with_capacity(points.len() + 2);
    extended.push(first - (second - first));
    extended.extend(points);
    extended.push(last + (last - previous));

    if extended.len() < MIN_SPLINE_POINTS {
        return Err(PathError::InsufficientAnchors {
            count: extended.len(),
        });
    }
    Ok(extended)
}

/// Everything computed before frames are picked.
///
/// Reusable for several frame counts: [`Self::frames`] only reads it.
#[derive(Debug, Clone)]
pub struct PathSynthesis {
    spline: VectorSpline,
    curve: FineCurve,
    field: DirectionField,
    diagnostics: PathDiagnostics,
}

impl PathSynthesis {
    pub fn synthesize(
        anchors: &[Point3],
        options: &InterpolatedPathOptions,
    ) -> Result<Self, PathError> {
        let mut metrics = PathMetrics::default();
        metrics.begin();
        let mut synthesis = Self::synthesize_with_metrics(anchors, options, &mut metrics)?;
        synthesis.diagnostics.timing = metrics.end();
        Ok(synthesis)
    }

    pub fn synthesize_with_metrics(
        anchors: &[Point3],
        options: &InterpolatedPathOptions,
        metrics: &mut PathMetrics,
    ) -> Result<Self, PathError> {
        options.validate()?;

        let (spline_point_count, spline) = metrics.time(TimingBucket::SplineFit, || {
            let extended = extend_anchors(anchors, options.closure.closed)?;
            let spline = VectorSpline::fit_indexed(&extended, options.smoothing_factor)?;
            Ok::<_, PathError>((extended.len(), spline))
        })?;
        log::debug!(
            "fitted {} spline points from {} anchors, residual {:.3}",
            spline_point_count,
            anchors.len(),
            spline.residual_sum_of_squares()
        );

        let curve = metrics.time(TimingBucket::FineSampling, || {
            FineCurve::sample(&spline, options.fine_samples, &options.speed)
        })?;

        let field = metrics.time(TimingBucket::DirectionIntegration, || {
            integrate_directions(&curve, &options.spring, &options.attractor, &options.closure)
        })?;

        let (min_speed, max_speed) = curve.speed_range().unwrap_or((1.0, 1.0));
        let diagnostics = PathDiagnostics {
            anchor_count: anchors.len(),
            spline_point_count,
            fine_sample_count: curve.len(),
            spline_residual: spline.residual_sum_of_squares(),
            geometric_length: curve.geometric_length(),
            travel_length: curve.total_travel(),
            min_speed,
            max_speed,
            closure_start: field.closure_start,
            max_norm_error: field.max_norm_error(),
            frame_count: 0,
            timing: None,
        };
        log::debug!(
            "fine curve: {} samples, length {:.1} pc, travel {:.1}, closure {:?}",
            diagnostics.fine_sample_count,
            diagnostics.geometric_length,
            diagnostics.travel_length,
            diagnostics.closure_start
        );

        Ok(Self {
            spline,
            curve,
            field,
            diagnostics,
        })
    }

    #[must_use]
    pub const fn spline(&self) -> &VectorSpline {
        &self.spline
    }

    #[must_use]
    pub const fn curve(&self) -> &FineCurve {
        &self.curve
    }

    #[must_use]
    pub fn directions(&self) -> &[Vec3] {
        &self.field.directions
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &PathDiagnostics {
        &self.diagnostics
    }

    /// Picks `n_frames` frames spaced evenly in travel time.
    pub fn frames(&self, n_frames: usize) -> Result<(CameraPath, PathDiagnostics), PathError> {
        let mut metrics = PathMetrics::default();
        metrics.begin();
        let (path, mut diagnostics) = self.frames_with_metrics(n_frames, &mut metrics)?;
        diagnostics.timing = metrics.end();
        Ok((path, diagnostics))
    }

    pub fn frames_with_metrics(
        &self,
        n_frames: usize,
        metrics: &mut PathMetrics,
    ) -> Result<(CameraPath, PathDiagnostics), PathError> {
        let indices = metrics.time(TimingBucket::FrameSampling, || {
            frame_indices(self.curve.travel_length(), n_frames)
        })?;

        let directions: Vec<Vec3> = indices.iter().map(|&i| self.field.directions[i]).collect();
        let angles = metrics.time(TimingBucket::AngleConversion, || {
            directions_to_camera_angles(&directions)
        });

        let points = self.curve.points();
        let path: CameraPath = indices
            .iter()
            .zip(angles)
            .map(|(&i, angles)| Frame::from_angles(points[i], angles))
            .collect();

        let diagnostics = PathDiagnostics {
            frame_count: path.len(),
            ..self.diagnostics.clone()
        };
        Ok((path, diagnostics))
    }
}

/// Builds a camera path through `anchors` with `n_frames` frames.
///
/// # Errors
/// Fails fast on a zero frame count, then propagates any fitting, sampling or
/// integration failure.
pub fn interpolated_path(
    anchors: &[Point3],
    n_frames: usize,
    options: &InterpolatedPathOptions,
) -> Result<(CameraPath, PathDiagnostics), PathError> {
    if n_frames == 0 {
        return Err(PathError::InvalidFrameCount {
            requested: 0,
            minimum: 1,
        });
    }

    let mut metrics = PathMetrics::default();
    metrics.begin();
    let synthesis = PathSynthesis::synthesize_with_metrics(anchors, options, &mut metrics)?;
    let (path, mut diagnostics) = synthesis.frames_with_metrics(n_frames, &mut metrics)?;
    diagnostics.timing = metrics.end();

    log::debug!(
        "interpolated path: {} frames over travel {:.1}",
        diagnostics.frame_count,
        diagnostics.travel_length
    );
    Ok((path, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mirrors_first_and_last_steps() {
        let anchors = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ];
        let extended = extend_anchors(&anchors, false).unwrap();
        assert_eq!(extended.len(), 5);
        assert_eq!(extended[0], Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(&extended[1..4], &anchors);
        assert_eq!(extended[4], Point3::new(1.0, 4.0, 0.0));
    }

    #[test]
    fn closed_extension_returns_to_start() {
        let anchors = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let extended = extend_anchors(&anchors, true).unwrap();
        assert_eq!(extended.len(), 6);
        assert_eq!(extended[4], anchors[0]);
        // Mirrors the closing step (1,1,0) -> (0,0,0).
        assert_eq!(extended[5], Point3::new(-1.0, -1.0, 0.0));
    }

    #[test]
    fn extension_rejects_bad_anchor_lists() {
        assert_eq!(
            extend_anchors(&[Point3::ORIGIN], false),
            Err(PathError::InsufficientAnchors { count: 1 })
        );
        let repeated = [Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert_eq!(
            extend_anchors(&repeated, false),
            Err(PathError::DegenerateStep {
                stage: StepStage::Anchor,
                index: 2,
            })
        );
        let looped = [Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), Point3::ORIGIN];
        assert!(extend_anchors(&looped, false).is_ok());
        assert!(matches!(
            extend_anchors(&looped, true),
            Err(PathError::DegenerateStep { index: 3, .. })
        ));
    }

    #[test]
    fn options_validation_names_the_bad_field() {
        let options = InterpolatedPathOptions::default().with_fine_samples(1);
        assert!(matches!(
            options.validate(),
            Err(PathError::InvalidParameter { name: "fine_samples", .. })
        ));
        let options = InterpolatedPathOptions::default().with_smoothing_factor(-1.0);
        assert!(matches!(
            options.validate(),
            Err(PathError::InvalidParameter { name: "smoothing_factor", .. })
        ));
        assert!(InterpolatedPathOptions::default().validate().is_ok());
    }
}
