//! Damped-spring integration of the camera's facing direction.
//!
//! The direction `d` chases the curve tangent through a spring of stiffness `k`
//! with velocity damping `γ`, while the attractor field adds a bias scaled by the
//! same `k`. Integration uses travel time as the step, so the camera turns more
//! per unit distance where it moves slowly.

use serde::{Deserialize, Serialize};

use super::PathError;
use super::fields::AttractorField;
use super::sampler::FineCurve;
use crate::geom::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionSpring {
    /// `k`, pull toward the tangent and scale of the attractor bias.
    pub stiffness: f64,
    /// `γ`, drag on the direction's rate of change.
    pub damping: f64,
}

impl DirectionSpring {
    #[must_use]
    pub const fn new(stiffness: f64, damping: f64) -> Self {
        Self { stiffness, damping }
    }

    pub fn validate(&self) -> Result<(), PathError> {
        if !self.stiffness.is_finite() || self.stiffness < 0.0 {
            return Err(PathError::InvalidParameter {
                name: "spring.stiffness",
                reason: "must be finite and >= 0",
            });
        }
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(PathError::InvalidParameter {
                name: "spring.damping",
                reason: "must be finite and >= 0",
            });
        }
        Ok(())
    }

    /// Advances `state` by one travel-time step `ds`.
    ///
    /// `bias` is the raw attractor force; it is scaled by the stiffness here.
    /// Returns `None` if the updated direction has zero length.
    #[must_use]
    pub fn step(&self, state: DirectionState, target: Vec3, bias: Vec3, ds: f64) -> Option<DirectionState> {
        let force = (target - state.direction) * self.stiffness - state.velocity * self.damping
            + bias * self.stiffness;
        let velocity = state.velocity + force * ds;
        let direction = (state.direction + velocity * ds).normalized()?;
        Some(DirectionState {
            direction,
            // Measured after normalization so the velocity stays tangent to the sphere.
            velocity: (direction - state.direction) / ds,
        })
    }
}

impl Default for DirectionSpring {
    fn default() -> Self {
        Self::new(0.0007, 0.1)
    }
}

/// Unit facing direction and its rate of change per unit travel time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionState {
    pub direction: Vec3,
    pub velocity: Vec3,
}

impl DirectionState {
    /// A motionless state facing along `direction`, normalized.
    #[must_use]
    pub fn at_rest(direction: Vec3) -> Option<Self> {
        Some(Self {
            direction: direction.normalized()?,
            velocity: Vec3::ZERO,
        })
    }
}

/// How a closed path hands the camera back to its starting direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopClosure {
    pub closed: bool,
    /// Travel time before the end at which the direction snaps back.
    pub close_distance: f64,
}

impl LoopClosure {
    #[must_use]
    pub const fn open() -> Self {
        Self {
            closed: false,
            close_distance: 100.0,
        }
    }

    #[must_use]
    pub const fn closed(close_distance: f64) -> Self {
        Self {
            closed: true,
            close_distance,
        }
    }

    pub fn validate(&self) -> Result<(), PathError> {
        if self.closed && (!self.close_distance.is_finite() || self.close_distance < 0.0) {
            return Err(PathError::InvalidParameter {
                name: "closure.close_distance",
                reason: "must be finite and >= 0",
            });
        }
        Ok(())
    }

    /// First fine-curve sample within `close_distance` of the end of travel.
    #[must_use]
    pub fn start_index(&self, travel_length: &[f64]) -> Option<usize> {
        if !self.closed {
            return None;
        }
        let total = travel_length.last().copied()?;
        let cutoff = total - self.close_distance;
        Some(travel_length.partition_point(|&s| s < cutoff))
    }
}

impl Default for LoopClosure {
    fn default() -> Self {
        Self::open()
    }
}

/// Unit facing direction at every fine-curve sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionField {
    pub directions: Vec<Vec3>,
    /// Sample from which directions were pinned to the initial one, if closed.
    pub closure_start: Option<usize>,
}

impl DirectionField {
    /// Largest deviation of any direction's length from 1.
    #[must_use]
    pub fn max_norm_error(&self) -> f64 {
        self.directions
            .iter()
            .map(|d| (d.length() - 1.0).abs())
            .fold(0.0, f64::max)
    }
}

/// Integrates the facing direction along `curve`.
///
/// The initial direction is the first tangent, at rest. The attractor is
/// evaluated at the previous sample's position. With a closed [`LoopClosure`],
/// every sample from [`LoopClosure::start_index`] on faces exactly along the
/// initial direction, so the last frame matches the first.
///
/// # Errors
/// [`PathError::DegenerateAttractor`] if a sample sits on the attractor, and
/// [`PathError::CollapsedDirection`] if the direction loses all length.
pub fn integrate_directions(
    curve: &FineCurve,
    spring: &DirectionSpring,
    attractor: &AttractorField,
    closure: &LoopClosure,
) -> Result<DirectionField, PathError> {
    let tangents = curve.tangents()?;
    let n = tangents.len();
    let initial =
        DirectionState::at_rest(tangents[0]).ok_or(PathError::CollapsedDirection { index: 0 })?;

    let closure_start = closure.start_index(curve.travel_length());
    let end = closure_start.unwrap_or(n).clamp(1, n);

    let points = curve.points();
    let steps = curve.travel_steps();
    let mut directions = Vec::with_capacity(n);
    directions.push(initial.direction);

    (1..end).try_fold(initial, |state, i| {
        let bias = attractor.force_at(points[i - 1])?;
        let next = spring
            .step(state, tangents[i], bias, steps[i - 1])
            .ok_or(PathError::CollapsedDirection { index: i })?;
        directions.push(next.direction);
        Ok::<_, PathError>(next)
    })?;

    directions.resize(n, initial.direction);

    Ok(DirectionField {
        directions,
        closure_start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Point3, Tolerance};
    use crate::path::SpeedField;

    fn arc(count: usize) -> FineCurve {
        let parameters: Vec<f64> = (0..count).map(|i| i as f64).collect();
        let points = parameters
            .iter()
            .map(|&t| {
                let angle = t / count as f64 * std::f64::consts::PI;
                Point3::new(300.0 * angle.cos(), 300.0 * angle.sin(), 10.0 * angle)
            })
            .collect();
        FineCurve::from_points(parameters, points, &SpeedField::default()).unwrap()
    }

    fn quiet_attractor() -> AttractorField {
        AttractorField::new(Point3::new(0.0, 0.0, -1000.0), 1000.0, 300.0).with_strength(0.0)
    }

    #[test]
    fn aligned_state_at_rest_stays_put() {
        let spring = DirectionSpring::default();
        let state = DirectionState::at_rest(Vec3::X).unwrap();
        let next = spring.step(state, Vec3::X, Vec3::ZERO, 0.5).unwrap();
        assert_eq!(next.direction, Vec3::X);
        assert_eq!(next.velocity, Vec3::ZERO);
    }

    #[test]
    fn spring_turns_toward_target() {
        let spring = DirectionSpring::new(0.5, 0.1);
        let state = DirectionState::at_rest(Vec3::X).unwrap();
        let next = spring.step(state, Vec3::Y, Vec3::ZERO, 1.0).unwrap();
        assert!(next.direction.y > 0.0);
        assert!(next.direction.x < 1.0);
        assert!((next.direction.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn directions_stay_unit_length() {
        let curve = arc(400);
        let attractor = AttractorField::new(Point3::new(0.0, 0.0, -50.0), 1000.0, 300.0);
        let field = integrate_directions(
            &curve,
            &DirectionSpring::default(),
            &attractor,
            &LoopClosure::open(),
        )
        .unwrap();
        assert_eq!(field.directions.len(), curve.len());
        assert!(field.max_norm_error() < 1e-9);
        assert_eq!(field.closure_start, None);
    }

    #[test]
    fn first_direction_is_first_tangent() {
        let curve = arc(50);
        let tangents = curve.tangents().unwrap();
        let field = integrate_directions(
            &curve,
            &DirectionSpring::default(),
            &quiet_attractor(),
            &LoopClosure::open(),
        )
        .unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_vec3(field.directions[0], tangents[0]));
    }

    #[test]
    fn closed_loop_pins_tail_to_initial_direction() {
        let curve = arc(200);
        let closure = LoopClosure::closed(curve.total_travel() * 0.25);
        let field = integrate_directions(
            &curve,
            &DirectionSpring::default(),
            &quiet_attractor(),
            &closure,
        )
        .unwrap();
        let start = field.closure_start.unwrap();
        assert!(start > 0 && start < curve.len());
        assert!(field.directions[start..].iter().all(|d| *d == field.directions[0]));
        assert_eq!(field.directions.last(), field.directions.first());
    }

    #[test]
    fn closure_longer_than_path_pins_everything() {
        let curve = arc(20);
        let closure = LoopClosure::closed(curve.total_travel() * 10.0);
        assert_eq!(closure.start_index(curve.travel_length()), Some(0));
        let field = integrate_directions(
            &curve,
            &DirectionSpring::default(),
            &quiet_attractor(),
            &closure,
        )
        .unwrap();
        assert!(field.directions.iter().all(|d| *d == field.directions[0]));
    }

    #[test]
    fn camera_on_attractor_is_an_error() {
        let parameters = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let points = parameters
            .iter()
            .map(|&t| Point3::new(t - 2.0, 0.0, 0.0))
            .collect();
        let curve = FineCurve::from_points(parameters, points, &SpeedField::default()).unwrap();
        let attractor = AttractorField::new(Point3::ORIGIN, 1000.0, 300.0);
        let result = integrate_directions(
            &curve,
            &DirectionSpring::default(),
            &attractor,
            &LoopClosure::open(),
        );
        assert_eq!(result, Err(PathError::DegenerateAttractor));
    }

    #[test]
    fn negative_spring_constants_are_rejected() {
        assert!(DirectionSpring::new(-1.0, 0.1).validate().is_err());
        assert!(DirectionSpring::new(0.1, f64::NAN).validate().is_err());
        assert!(DirectionSpring::default().validate().is_ok());
    }
}
