//! The physics collaborator boundary
//!
//! The rig and the possession protocol never talk to a physics engine
//! directly; they go through [`PhysicsService`]. [`crate::PhysicsWorld`] is the
//! rapier-backed implementation used by the demo host.

use glam::Vec3;
use possession_core::{BodyId, Pose, Ray};

/// Which colliders a ray query considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLayer {
    /// Only possessable bodies
    Possession,
    /// Every collider in the scene, static geometry included
    All,
}

/// First intersection along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The possessable body that was hit, or `None` for static geometry
    pub body: Option<BodyId>,
    /// Distance along the ray to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Operations the simulation core needs from the physics engine
pub trait PhysicsService {
    /// Current pose of a body
    fn pose(&self, body: BodyId) -> Option<Pose>;

    /// Teleport a body
    fn set_pose(&mut self, body: BodyId, pose: Pose);

    /// Turn gravity on or off for a body
    fn set_gravity_enabled(&mut self, body: BodyId, enabled: bool);

    /// Zero linear and angular velocity
    fn zero_velocity(&mut self, body: BodyId);

    /// Apply an instantaneous impulse at the body's center of mass
    fn apply_impulse(&mut self, body: BodyId, impulse: Vec3);

    /// Cast a ray and return the first hit within `max_distance`.
    ///
    /// `exclude` skips one body, typically the one the ray starts inside.
    fn cast_ray(
        &self,
        ray: &Ray,
        max_distance: f32,
        layer: QueryLayer,
        exclude: Option<BodyId>,
    ) -> Option<RayHit>;
}
