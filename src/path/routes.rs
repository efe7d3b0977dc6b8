//! Named camera routes through the local dust.
//!
//! Positions are heliocentric Galactic Cartesian coordinates in parsecs.

use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::PathError;
use super::fields::{AttractorField, SpeedField};
use super::frame::{CameraPath, Frame};
use super::integrator::{DirectionSpring, LoopClosure};
use super::interpolated::{InterpolatedPathOptions, PathDiagnostics, interpolated_path};
use crate::geom::{Point3, Spherical, Vec3, uniform_parameters};

/// Unit vector toward Galactic longitude `l` and latitude `b`, in degrees.
#[must_use]
pub fn galactic_direction(l_deg: f64, b_deg: f64) -> Vec3 {
    Spherical {
        radius: 1.0,
        latitude: b_deg.to_radians(),
        longitude: l_deg.to_radians(),
    }
    .unit_vector()
}

fn require_frames(n_frames: usize, minimum: usize) -> Result<(), PathError> {
    if n_frames < minimum {
        Err(PathError::InvalidFrameCount {
            requested: n_frames,
            minimum,
        })
    } else {
        Ok(())
    }
}

/// Straight flight from the Sun toward Orion (`l = -148°`, `b = -13°`), out to
/// 1 kpc, looking straight ahead.
pub fn orion_flythrough(n_frames: usize) -> Result<CameraPath, PathError> {
    const L: f64 = -148.0;
    const B: f64 = -13.0;
    require_frames(n_frames, 1)?;

    let heading = galactic_direction(L, B);
    Ok(uniform_parameters(0.0, 1000.0, n_frames)
        .into_iter()
        .map(|distance| Frame::new(Point3::ORIGIN + heading * distance, 90.0 - B, L))
        .collect())
}

/// The three fixed viewpoints used for the published renderings.
#[must_use]
pub fn paper_renderings() -> CameraPath {
    const VIEWS: [([f64; 3], f64, f64); 3] = [
        ([0.0, 0.0, 0.0], 96.0, 185.0),
        ([147.0, 26.0, 63.0], 103.4, 190.2),
        ([144.0, 41.0, 67.0], 104.1, 196.0),
    ];
    VIEWS
        .iter()
        .map(|&(position, alpha, beta)| Frame::new(Point3::from(position), alpha, beta))
        .collect()
}

/// Zoom out from the Sun, then swing back and forth around a point above the
/// plane, always looking back toward the Sun's side.
///
/// A quarter of the frames zoom; the remaining three quarters orbit.
pub fn local_dust_path(n_frames: usize) -> Result<CameraPath, PathError> {
    const END_X: f64 = 150.0;
    const END_Z: f64 = 55.0;
    const LIFT: f64 = 20.0;
    const BACKOFF: f64 = 200.0;
    const SWING_DEG: f64 = 25.0;
    const BOB: f64 = 20.0;
    require_frames(n_frames, 4)?;

    let zoom_count = n_frames / 4;
    let orbit_count = 3 * n_frames / 4;

    let tilt = ((END_Z + LIFT) / (END_X + BACKOFF)).atan().to_degrees();
    let zoom = uniform_parameters(0.0, 1.0, zoom_count)
        .into_iter()
        .zip(uniform_parameters(90.0 + tilt / 2.0, 90.0 + tilt, zoom_count))
        .map(|(t, alpha)| Frame::new(Point3::new(END_X * t, 0.0, END_Z * t), alpha, 180.0));

    let orbit = uniform_parameters(0.0, TAU, orbit_count).into_iter().map(|theta| {
        let swing = SWING_DEG.to_radians() * theta.sin();
        let position = Point3::new(
            END_X * swing.cos(),
            END_X * swing.sin(),
            END_Z + BOB * theta.sin(),
        );
        let alpha = 90.0 + ((position.z + LIFT) / (END_X + BACKOFF)).atan().to_degrees();
        Frame::new(position, alpha, 180.0 + swing.to_degrees())
    });

    Ok(zoom.chain(orbit).collect())
}

/// Waypoints of the closed grand tour, parsecs.
pub const GRAND_TOUR_ANCHORS: [[f64; 3]; 14] = [
    [700.0, 70.0, 70.0],
    [500.0, 60.0, 50.0],
    [150.0, 40.0, 10.0],
    [5.0, 10.0, -10.0],
    [-80.0, -40.0, -30.0],
    [-400.0, -230.0, -100.0],
    [-700.0, -200.0, -100.0],
    [-800.0, -100.0, 0.0],
    [-700.0, 50.0, 150.0],
    [-200.0, 300.0, 400.0],
    [400.0, 400.0, 450.0],
    [1200.0, 350.0, 400.0],
    [1100.0, 150.0, 200.0],
    [850.0, 85.0, 100.0],
];

/// Options for the grand tour: a stiffer, more damped spring, an attractor
/// below the plane toward the inner Galaxy, and a linear speed ramp.
#[must_use]
pub fn grand_tour_options() -> InterpolatedPathOptions {
    InterpolatedPathOptions {
        spring: DirectionSpring::new(0.001, 0.15),
        attractor: AttractorField::new(Point3::new(-300.0, 0.0, -50.0), 500.0, 200.0),
        speed: SpeedField::new(Point3::ORIGIN, 500.0, 500.0, 1.0),
        closure: LoopClosure::closed(500.0),
        ..InterpolatedPathOptions::default()
    }
}

/// A closed loop through [`GRAND_TOUR_ANCHORS`].
pub fn grand_tour_path(n_frames: usize) -> Result<(CameraPath, PathDiagnostics), PathError> {
    let anchors: Vec<Point3> = GRAND_TOUR_ANCHORS.iter().copied().map(Point3::from).collect();
    interpolated_path(&anchors, n_frames, &grand_tour_options())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleOptions {
    /// Semi-axis along x, parsecs.
    pub radius_x: f64,
    /// Semi-axis along y, parsecs.
    pub radius_y: f64,
    /// Galactic longitude of the stare point, degrees.
    pub stare_longitude: f64,
    /// Galactic latitude of the stare point, degrees.
    pub stare_latitude: f64,
    /// Distance of the stare point from the Sun, parsecs.
    pub stare_distance: f64,
    /// Distance between the two stereo eyes, parsecs.
    pub eye_separation: f64,
}

impl Default for CircleOptions {
    fn default() -> Self {
        Self {
            radius_x: 50.0,
            radius_y: 50.0,
            stare_longitude: 180.0,
            stare_latitude: -10.0,
            stare_distance: 500.0,
            eye_separation: 20.0,
        }
    }
}

impl CircleOptions {
    #[must_use]
    pub fn stare_point(&self) -> Point3 {
        Point3::ORIGIN
            + galactic_direction(self.stare_longitude, self.stare_latitude) * self.stare_distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StereoEye {
    #[default]
    Center,
    Left,
    Right,
}

impl StereoEye {
    /// Offset along the camera's right-hand axis, in units of half the separation.
    #[must_use]
    pub const fn side(self) -> f64 {
        match self {
            Self::Center => 0.0,
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "center" | "centre" | "mono" => Some(Self::Center),
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Circles the Sun in the Galactic plane while staring at one distant point.
///
/// Frames sit at `n_frames` angles evenly spaced over a full turn, the closing
/// angle excluded. Stereo eyes are shifted half the eye separation to either
/// side of the center position and toe in on the same stare point.
pub fn circle_local(
    n_frames: usize,
    options: &CircleOptions,
    eye: StereoEye,
) -> Result<CameraPath, PathError> {
    require_frames(n_frames, 1)?;
    let stare = options.stare_point();
    if !stare.is_finite() || !options.radius_x.is_finite() || !options.radius_y.is_finite() {
        return Err(PathError::NonFiniteInput);
    }
    let half_separation = 0.5 * options.eye_separation * eye.side();

    let mut angles = uniform_parameters(0.0, TAU, n_frames + 1);
    angles.pop();

    Ok(angles
        .into_iter()
        .map(|theta| {
            let center = Point3::new(options.radius_x * theta.cos(), options.radius_y * theta.sin(), 0.0);
            let right = (stare - center).cross(Vec3::Z).normalized().unwrap_or(Vec3::X);
            Frame::looking_at(center + right * half_separation, stare)
        })
        .collect())
}

/// Every built-in route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Orion,
    PaperRenderings,
    LocalDust,
    GrandTour,
    CircleLocal,
}

impl Route {
    pub const ALL: [Self; 5] = [
        Self::Orion,
        Self::PaperRenderings,
        Self::LocalDust,
        Self::GrandTour,
        Self::CircleLocal,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Orion => "orion",
            Self::PaperRenderings => "paper",
            Self::LocalDust => "local_dust",
            Self::GrandTour => "grand_tour",
            Self::CircleLocal => "circle_local",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Orion => "straight flight toward Orion out to 1 kpc",
            Self::PaperRenderings => "three fixed viewpoints (frame count ignored)",
            Self::LocalDust => "zoom out, then orbit above the plane",
            Self::GrandTour => "smooth closed loop through 14 waypoints",
            Self::CircleLocal => "circle the Sun staring at one point (supports stereo eyes)",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase().replace('-', "_");
        match name.as_str() {
            "orion" => Some(Self::Orion),
            "paper" | "paper_renderings" => Some(Self::PaperRenderings),
            "local_dust" | "ld" => Some(Self::LocalDust),
            "grand_tour" | "gt" => Some(Self::GrandTour),
            "circle_local" | "cl" => Some(Self::CircleLocal),
            _ => None,
        }
    }

    /// Builds the route. `eye` only affects [`Route::CircleLocal`].
    pub fn build(self, n_frames: usize, eye: StereoEye) -> Result<CameraPath, PathError> {
        match self {
            Self::Orion => orion_flythrough(n_frames),
            Self::PaperRenderings => Ok(paper_renderings()),
            Self::LocalDust => local_dust_path(n_frames),
            Self::GrandTour => grand_tour_path(n_frames).map(|(path, _)| path),
            Self::CircleLocal => circle_local(n_frames, &CircleOptions::default(), eye),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
