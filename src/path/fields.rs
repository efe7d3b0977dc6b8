//! Scalar speed field and attractor force field.
//!
//! Both fields split the offset from their center into a horizontal separation
//! `R` (in the Galactic plane) and a vertical separation `Z`, each measured in
//! its own length scale.

use serde::{Deserialize, Serialize};

use super::PathError;
use crate::geom::{Point3, Tolerance, Vec3};

/// Force magnitude prefactor, roughly `e⁻²`.
pub const ATTRACTOR_STRENGTH: f64 = 0.13533;

/// Travel speed `v = 1 + ρ^scaling` with `ρ² = (R/R0)² + (Z/Z0)²`.
///
/// The camera moves slowest (`v = 1`) at the center and speeds up with distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedField {
    pub center: Point3,
    /// `R0`, parsecs.
    pub radial_scale: f64,
    /// `Z0`, parsecs.
    pub vertical_scale: f64,
    /// Exponent on `ρ`; must be positive.
    pub scaling: f64,
}

impl SpeedField {
    #[must_use]
    pub const fn new(center: Point3, radial_scale: f64, vertical_scale: f64, scaling: f64) -> Self {
        Self {
            center,
            radial_scale,
            vertical_scale,
            scaling,
        }
    }

    pub fn validate(&self) -> Result<(), PathError> {
        if !self.center.is_finite() {
            return Err(PathError::NonFiniteInput);
        }
        check_scale("speed.radial_scale", self.radial_scale)?;
        check_scale("speed.vertical_scale", self.vertical_scale)?;
        if !self.scaling.is_finite() || self.scaling <= 0.0 {
            return Err(PathError::InvalidParameter {
                name: "speed.scaling",
                reason: "must be finite and > 0",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn speed_at(&self, position: Point3) -> f64 {
        let offset = position - self.center;
        let r = offset.horizontal_length() / self.radial_scale;
        let z = offset.z / self.vertical_scale;
        1.0 + r.hypot(z).powf(self.scaling)
    }
}

impl Default for SpeedField {
    fn default() -> Self {
        Self::new(Point3::ORIGIN, 1000.0, 1000.0, 0.5)
    }
}

/// Fictitious force pulling the camera's gaze toward `center`.
///
/// The magnitude `U = strength · exp(R/R0 + |Z|/Z0)` grows with distance, so the
/// pull is weak nearby and dominates far away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttractorField {
    pub center: Point3,
    /// `R0`, parsecs.
    pub radial_scale: f64,
    /// `Z0`, parsecs.
    pub vertical_scale: f64,
    /// Prefactor `c`; zero switches the field off.
    pub strength: f64,
}

impl AttractorField {
    #[must_use]
    pub const fn new(center: Point3, radial_scale: f64, vertical_scale: f64) -> Self {
        Self {
            center,
            radial_scale,
            vertical_scale,
            strength: ATTRACTOR_STRENGTH,
        }
    }

    #[must_use]
    pub const fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn validate(&self) -> Result<(), PathError> {
        if !self.center.is_finite() || !self.strength.is_finite() {
            return Err(PathError::NonFiniteInput);
        }
        check_scale("attractor.radial_scale", self.radial_scale)?;
        check_scale("attractor.vertical_scale", self.vertical_scale)
    }

    /// Force on a camera at `camera`, pointing from the camera toward the center.
    ///
    /// # Errors
    /// [`PathError::DegenerateAttractor`] when the camera sits on the center.
    pub fn force_at(&self, camera: Point3) -> Result<Vec3, PathError> {
        let offset = camera - self.center;
        let r = offset.horizontal_length();
        let rho = r.hypot(offset.z);
        if Tolerance::ZERO_LENGTH.approx_zero_f64(rho) {
            return Err(PathError::DegenerateAttractor);
        }
        let magnitude =
            self.strength * (r / self.radial_scale + offset.z.abs() / self.vertical_scale).exp();
        Ok(offset * (-magnitude / rho))
    }
}

impl Default for AttractorField {
    fn default() -> Self {
        Self::new(Point3::ORIGIN, 1000.0, 300.0)
    }
}

fn check_scale(name: &'static str, value: f64) -> Result<(), PathError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PathError::InvalidParameter {
            name,
            reason: "length scale must be finite and > 0",
        })
    }
}
