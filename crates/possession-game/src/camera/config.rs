//! Camera configuration

use glam::Vec3;
use possession_core::Pose;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Frame of reference for a view anchor's position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorSpace {
    /// Absolute world position
    World,
    /// Offset from the tracked body (world position when nothing is tracked)
    Tracked,
}

/// Where the camera goes for one mode: a position and an Euler orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewAnchor {
    pub position: Vec3,
    pub orientation: Vec3,
    pub space: AnchorSpace,
}

impl ViewAnchor {
    /// Anchor at an absolute world position
    pub fn world(position: Vec3, orientation: Vec3) -> Self {
        Self {
            position,
            orientation,
            space: AnchorSpace::World,
        }
    }

    /// Anchor relative to the tracked body
    pub fn tracked(offset: Vec3, orientation: Vec3) -> Self {
        Self {
            position: offset,
            orientation,
            space: AnchorSpace::Tracked,
        }
    }

    /// World-space pose of this anchor given the tracked body's position
    pub fn resolve(&self, tracked_position: Option<Vec3>) -> Pose {
        let position = match (self.space, tracked_position) {
            (AnchorSpace::Tracked, Some(origin)) => origin + self.position,
            _ => self.position,
        };
        Pose::new(position, self.orientation)
    }
}

/// How the rig follows its tracked body while idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingPolicy {
    /// Re-snap to `body + offset` every idle tick
    #[default]
    AlwaysSnap,
    /// Only re-snap while the camera is within `|offset| + drift_margin` of the body
    DriftBand,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Transition travel speed in units per second
    pub fly_speed: f32,
    /// Transition rotation speed in degrees per second
    pub rotate_speed: f32,
    /// Easing shape (0 = linear, 2 = steepest S-curve)
    pub ease_factor: f32,
    /// Minimum anchor distance for a transition to start
    pub anchor_epsilon: f32,
    /// Free-flight speed while idle (units per second at full axis)
    pub move_speed: f32,
    /// Pitch change in degrees per unit of vertical look input
    pub pitch_speed: f32,
    /// Minimum pitch angle in degrees for mouse look
    pub pitch_min: f32,
    /// Maximum pitch angle in degrees for mouse look
    pub pitch_max: f32,
    /// Tracking behavior while idle
    pub tracking: TrackingPolicy,
    /// Extra distance tolerated by [`TrackingPolicy::DriftBand`]
    pub drift_margin: f32,
    /// Vertical field of view in degrees (for cursor picking)
    pub fov_degrees: f32,
    /// Viewport width / height (for cursor picking)
    pub aspect_ratio: f32,
    /// The overhead view
    pub god_anchor: ViewAnchor,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fly_speed: 10.0,
            rotate_speed: 180.0,
            ease_factor: 1.0,
            anchor_epsilon: 0.5,
            move_speed: 30.0,
            pitch_speed: 45.0,
            pitch_min: -90.0,
            pitch_max: 90.0,
            tracking: TrackingPolicy::AlwaysSnap,
            drift_margin: 0.5,
            fov_degrees: 60.0,
            aspect_ratio: 16.0 / 9.0,
            // Looks straight down on the play area
            god_anchor: ViewAnchor::world(Vec3::new(0.0, 30.0, 0.0), Vec3::new(-90.0, 0.0, 0.0)),
        }
    }
}

impl CameraConfig {
    /// Check that every value is usable by the rig
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.ease_factor) {
            return Err(ConfigError::OutOfRange {
                field: "camera.ease_factor",
                value: self.ease_factor,
                min: 0.0,
                max: 2.0,
            });
        }
        if self.fly_speed <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "camera.fly_speed",
                value: self.fly_speed,
            });
        }
        if self.rotate_speed <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "camera.rotate_speed",
                value: self.rotate_speed,
            });
        }
        if self.anchor_epsilon < 0.0 {
            return Err(ConfigError::Negative {
                field: "camera.anchor_epsilon",
                value: self.anchor_epsilon,
            });
        }
        if self.drift_margin < 0.0 {
            return Err(ConfigError::Negative {
                field: "camera.drift_margin",
                value: self.drift_margin,
            });
        }
        if !(1.0..=179.0).contains(&self.fov_degrees) {
            return Err(ConfigError::OutOfRange {
                field: "camera.fov_degrees",
                value: self.fov_degrees,
                min: 1.0,
                max: 179.0,
            });
        }
        if self.aspect_ratio <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "camera.aspect_ratio",
                value: self.aspect_ratio,
            });
        }
        if self.pitch_min > self.pitch_max {
            return Err(ConfigError::InvertedRange {
                field: "camera.pitch_min/pitch_max",
            });
        }
        Ok(())
    }
}
