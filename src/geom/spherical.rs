//! Cartesian to spherical conversion and the camera angle convention.
//!
//! Latitude is measured up from the XY plane and longitude counter-clockwise from
//! +X, both in radians. Camera angles are in degrees: the polar angle `alpha` is
//! measured down from +Z (90° looks along the Galactic plane) and the azimuth
//! `beta` is the longitude wrapped to `[0°, 360°)`.

use serde::{Deserialize, Serialize};

use super::core::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub radius: f64,
    /// Radians in `[-π/2, π/2]`.
    pub latitude: f64,
    /// Radians in `(-π, π]`.
    pub longitude: f64,
}

impl Spherical {
    /// Converts a Cartesian vector. The zero vector maps to latitude and
    /// longitude 0.
    #[must_use]
    pub fn from_cartesian(v: Vec3) -> Self {
        Self {
            radius: v.length(),
            latitude: v.z.atan2(v.horizontal_length()),
            longitude: v.y.atan2(v.x),
        }
    }

    /// Unit vector pointing along (latitude, longitude); the radius is ignored.
    #[must_use]
    pub fn unit_vector(self) -> Vec3 {
        let (sin_lat, cos_lat) = self.latitude.sin_cos();
        let (sin_lon, cos_lon) = self.longitude.sin_cos();
        Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    #[must_use]
    pub fn to_cartesian(self) -> Vec3 {
        self.unit_vector() * self.radius
    }
}

/// Camera orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraAngles {
    /// Polar angle from +Z; 90° is level with the Galactic plane.
    pub alpha: f64,
    /// Azimuth in `[0°, 360°)`.
    pub beta: f64,
}

impl CameraAngles {
    #[must_use]
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta: wrap_degrees(beta),
        }
    }

    #[must_use]
    pub fn from_direction(direction: Vec3) -> Self {
        let sph = Spherical::from_cartesian(direction);
        Self::new(90.0 - sph.latitude.to_degrees(), sph.longitude.to_degrees())
    }

    /// Unit vector the camera looks along.
    #[must_use]
    pub fn direction(self) -> Vec3 {
        Spherical {
            radius: 1.0,
            latitude: (90.0 - self.alpha).to_radians(),
            longitude: self.beta.to_radians(),
        }
        .unit_vector()
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
#[must_use]
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(feature = "parallel")]
#[must_use]
pub fn cartesian_to_spherical(vectors: &[Vec3]) -> Vec<Spherical> {
    vectors.par_iter().copied().map(Spherical::from_cartesian).collect()
}

#[cfg(not(feature = "parallel"))]
#[must_use]
pub fn cartesian_to_spherical(vectors: &[Vec3]) -> Vec<Spherical> {
    vectors.iter().copied().map(Spherical::from_cartesian).collect()
}

#[cfg(feature = "parallel")]
#[must_use]
pub fn directions_to_camera_angles(directions: &[Vec3]) -> Vec<CameraAngles> {
    directions
        .par_iter()
        .copied()
        .map(CameraAngles::from_direction)
        .collect()
}

#[cfg(not(feature = "parallel"))]
#[must_use]
pub fn directions_to_camera_angles(directions: &[Vec3]) -> Vec<CameraAngles> {
    directions
        .iter()
        .copied()
        .map(CameraAngles::from_direction)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Tolerance;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn axis_vectors_convert_to_expected_angles() {
        let sph = Spherical::from_cartesian(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(sph.radius, 2.0);
        assert_eq!(sph.latitude, 0.0);
        assert!((sph.longitude - std::f64::consts::FRAC_PI_2).abs() < 1e-15);

        let up = Spherical::from_cartesian(Vec3::Z);
        assert!((up.latitude - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
    }

    #[test]
    fn zero_vector_has_zero_angles() {
        let sph = Spherical::from_cartesian(Vec3::ZERO);
        assert_eq!(sph.radius, 0.0);
        assert_eq!(sph.latitude, 0.0);
        assert_eq!(sph.longitude, 0.0);
    }

    #[test]
    fn random_directions_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let tol = Tolerance::DEFAULT;
        for _ in 0..1000 {
            let v = Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            );
            let Some(unit) = v.normalized() else {
                continue;
            };
            let sph = Spherical::from_cartesian(unit);
            assert!(tol.approx_eq_vec3(sph.unit_vector(), unit));
            assert!(tol.approx_eq_vec3(sph.to_cartesian(), unit));

            let angles = CameraAngles::from_direction(unit);
            assert!((0.0..360.0).contains(&angles.beta));
            assert!((0.0..=180.0).contains(&angles.alpha));
            assert!(tol.approx_eq_vec3(angles.direction(), unit));
        }
    }

    #[test]
    fn camera_angles_follow_polar_convention() {
        let level = CameraAngles::from_direction(Vec3::X);
        assert_eq!(level.alpha, 90.0);
        assert_eq!(level.beta, 0.0);

        let down = CameraAngles::from_direction(-Vec3::Z);
        assert!((down.alpha - 180.0).abs() < 1e-12);

        let west = CameraAngles::from_direction(-Vec3::Y);
        assert!((west.beta - 270.0).abs() < 1e-12);
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert_eq!(wrap_degrees(-148.0), 212.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(725.0), 5.0);
        assert_eq!(wrap_degrees(-1e-17), 0.0);
    }

    #[test]
    fn batch_conversion_preserves_order() {
        let vectors = [Vec3::X, Vec3::Y, -Vec3::X];
        let sph = cartesian_to_spherical(&vectors);
        assert_eq!(sph.len(), 3);
        assert_eq!(sph[0].longitude, 0.0);
        assert!((sph[2].longitude.abs() - std::f64::consts::PI).abs() < 1e-15);

        let angles = directions_to_camera_angles(&vectors);
        assert!((angles[1].beta - 90.0).abs() < 1e-12);
        assert!((angles[2].beta - 180.0).abs() < 1e-12);
    }
}
