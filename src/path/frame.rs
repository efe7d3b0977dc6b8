use serde::{Deserialize, Serialize};

use crate::geom::{CameraAngles, Point3, Vec3, wrap_degrees};

/// One rendered camera: where it is and where it looks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub position: Point3,
    /// Polar angle from +Z, degrees.
    pub alpha: f64,
    /// Azimuth in `[0, 360)` degrees.
    pub beta: f64,
}

impl Frame {
    /// Builds a frame, wrapping `beta` into `[0, 360)`.
    #[must_use]
    pub fn new(position: Point3, alpha: f64, beta: f64) -> Self {
        Self {
            position,
            alpha,
            beta: wrap_degrees(beta),
        }
    }

    #[must_use]
    pub fn looking_along(position: Point3, direction: Vec3) -> Self {
        Self::from_angles(position, CameraAngles::from_direction(direction))
    }

    /// A camera at `position` aimed at `target`. Coincident points face +X.
    #[must_use]
    pub fn looking_at(position: Point3, target: Point3) -> Self {
        Self::looking_along(position, target - position)
    }

    #[must_use]
    pub fn from_angles(position: Point3, angles: CameraAngles) -> Self {
        Self::new(position, angles.alpha, angles.beta)
    }

    #[must_use]
    pub fn angles(&self) -> CameraAngles {
        CameraAngles::new(self.alpha, self.beta)
    }

    /// Unit viewing direction.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.angles().direction()
    }
}

/// Ordered camera frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPath {
    pub frames: Vec<Frame>,
}

impl CameraPath {
    #[must_use]
    pub const fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    #[must_use]
    pub fn positions(&self) -> Vec<Point3> {
        self.frames.iter().map(|f| f.position).collect()
    }

    /// Appends `other`'s frames after this path's.
    pub fn append(&mut self, other: CameraPath) {
        self.frames.extend(other.frames);
    }

    /// Flattens to `[x, y, z, alpha, beta]` rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<[f64; 5]> {
        self.frames
            .iter()
            .map(|f| [f.position.x, f.position.y, f.position.z, f.alpha, f.beta])
            .collect()
    }
}

impl FromIterator<Frame> for CameraPath {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CameraPath {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl IntoIterator for CameraPath {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Tolerance;

    #[test]
    fn frame_wraps_negative_azimuth() {
        let frame = Frame::new(Point3::ORIGIN, 103.0, -148.0);
        assert_eq!(frame.beta, 212.0);
    }

    #[test]
    fn looking_at_points_toward_target() {
        let frame = Frame::looking_at(Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, 5.0, 0.0));
        assert!((frame.alpha - 90.0).abs() < 1e-12);
        assert!((frame.beta - 90.0).abs() < 1e-12);
        assert!(Tolerance::DEFAULT.approx_eq_vec3(frame.direction(), Vec3::Y));
    }

    #[test]
    fn rows_keep_frame_order() {
        let path: CameraPath = (0..3)
            .map(|i| Frame::new(Point3::new(f64::from(i), 0.0, 0.0), 90.0, 10.0 * f64::from(i)))
            .collect();
        let rows = path.to_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], [2.0, 0.0, 0.0, 90.0, 20.0]);
    }
}
