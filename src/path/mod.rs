//! Camera path synthesis.
//!
//! Anchors are padded, fitted with a [`VectorSpline`](crate::geom::VectorSpline),
//! resampled into a [`FineCurve`] parametrized by travel time, and given a
//! smoothly evolving facing direction by the damped spring in [`integrator`].
//! [`interpolated_path`] ties the stages together; [`routes`] holds fixed camera
//! rigs and waypoint lists.

use std::fmt;

use crate::geom::SplineError;

mod fields;
mod frame;
mod integrator;
mod interpolated;
mod metrics;
mod routes;
mod sampler;

pub use fields::{ATTRACTOR_STRENGTH, AttractorField, SpeedField};
pub use frame::{CameraPath, Frame};
pub use integrator::{DirectionField, DirectionSpring, DirectionState, LoopClosure, integrate_directions};
pub use interpolated::{
    DEFAULT_FINE_SAMPLES, InterpolatedPathOptions, PathDiagnostics, PathSynthesis, extend_anchors,
    interpolated_path,
};
pub use metrics::{PathMetrics, PathTimingReport, TimingBucket};
pub use routes::{
    CircleOptions, GRAND_TOUR_ANCHORS, Route, StereoEye, circle_local, galactic_direction,
    grand_tour_options, grand_tour_path, local_dust_path, orion_flythrough, paper_renderings,
};
pub use sampler::{FineCurve, frame_indices};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("path needs at least 4 spline points after padding, got {count}")]
    InsufficientAnchors { count: usize },
    #[error("camera position coincides with the attractor")]
    DegenerateAttractor,
    #[error("zero-length step at {stage} {index}")]
    DegenerateStep { stage: StepStage, index: usize },
    #[error("frame count must be at least {minimum}, got {requested}")]
    InvalidFrameCount { requested: usize, minimum: usize },
    #[error("path inputs must be finite")]
    NonFiniteInput,
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    #[error("camera direction collapsed to zero at fine-curve sample {index}")]
    CollapsedDirection { index: usize },
    #[error("fine curve has no samples")]
    EmptyCurve,
    #[error(transparent)]
    Spline(SplineError),
}

impl From<SplineError> for PathError {
    fn from(err: SplineError) -> Self {
        match err {
            SplineError::TooFewPoints { count, .. } => Self::InsufficientAnchors { count },
            other => Self::Spline(other),
        }
    }
}

/// Where a zero-length step was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStage {
    /// Between two consecutive anchors; the index is the repeated anchor.
    Anchor,
    /// Between two fine-curve samples; the index is the segment.
    FineCurve,
}

impl fmt::Display for StepStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anchor => f.write_str("anchor"),
            Self::FineCurve => f.write_str("fine-curve segment"),
        }
    }
}

#[cfg(test)]
mod tests;
