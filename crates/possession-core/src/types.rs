//! Core types used throughout the possession workspace

use std::fmt;

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Identifier of a physical body in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Identifier of a rendering camera object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CameraId(pub u32);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera#{}", self.0)
    }
}

/// Wrap an angle in degrees into `[-180, 180)`
pub fn wrap_degrees(angle: f32) -> f32 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Position plus orientation.
///
/// Orientation is stored as Euler angles in degrees: `x` is pitch (positive
/// looks up), `y` is yaw, `z` is roll. Forward is negative Z in local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
        }
    }
}

impl Pose {
    /// Create a pose from a position and Euler orientation (degrees)
    pub fn new(position: Vec3, orientation: Vec3) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Create a pose at the given position with no rotation
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a pose from a position and quaternion rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
        Self {
            position,
            orientation: Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees()),
        }
    }

    /// Orientation as a quaternion
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.orientation.y.to_radians(),
            self.orientation.x.to_radians(),
            self.orientation.z.to_radians(),
        )
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation() * -Vec3::Z
    }

    /// Angle in degrees between this pose's orientation and another's
    pub fn angle_to(&self, other: &Pose) -> f32 {
        self.rotation().angle_between(other.rotation()).to_degrees()
    }

    /// Whether two poses match within a tolerance (units for position, degrees for orientation)
    pub fn approx_eq(&self, other: &Pose, tolerance: f32) -> bool {
        let turn = Vec3::new(
            wrap_degrees(self.orientation.x - other.orientation.x),
            wrap_degrees(self.orientation.y - other.orientation.y),
            wrap_degrees(self.orientation.z - other.orientation.z),
        );
        self.position.distance(other.position) <= tolerance && turn.abs().max_element() <= tolerance
    }

    /// Interpolate position and orientation with independent parameters.
    ///
    /// Orientation components take the shortest way around the circle.
    pub fn lerp(a: &Pose, b: &Pose, move_t: f32, rotate_t: f32) -> Pose {
        let delta = Vec3::new(
            wrap_degrees(b.orientation.x - a.orientation.x),
            wrap_degrees(b.orientation.y - a.orientation.y),
            wrap_degrees(b.orientation.z - a.orientation.z),
        );
        Pose {
            position: a.position.lerp(b.position, move_t),
            orientation: a.orientation + delta * rotate_t,
        }
    }
}

/// A ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction. Returns `None` for a zero direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// Create a ray from `from` towards `to`, with the distance between them
    pub fn between(from: Vec3, to: Vec3) -> Option<(Self, f32)> {
        let ray = Self::new(from, to - from)?;
        Some((ray, from.distance(to)))
    }

    /// Point along the ray at distance `t`
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
