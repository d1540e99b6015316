//! Possession Core - Core types and utilities shared by the rig and the physics boundary
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - `Pose` and `Ray` for body/camera placement and picking
//! - Identifiers for bodies and camera objects
//! - Simulation time and deadlines for tick-driven timers

pub mod time;
pub mod types;

pub use glam::{EulerRot, Quat, Vec2, Vec3};
pub use time::{Deadline, GameTime, TimeConfig};
pub use types::{wrap_degrees, BodyId, CameraId, Pose, Ray};
