mod core;
mod curve;
mod spherical;
mod spline;

pub use core::{Point3, Tolerance, Vec3};
pub use curve::{Curve3, evaluate_curve_points, tessellate_curve_uniform, uniform_parameters};
pub use spherical::{
    CameraAngles, Spherical, cartesian_to_spherical, directions_to_camera_angles, wrap_degrees,
};
pub use spline::{
    DEFAULT_SMOOTHING_FACTOR, MIN_SPLINE_POINTS, SmoothingSpline, SplineError, VectorSpline,
};
