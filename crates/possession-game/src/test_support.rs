//! Lightweight collaborators for unit tests

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use possession_core::{BodyId, CameraId, Pose, Ray};
use possession_physics::{PhysicsService, QueryLayer, RayHit};

use crate::services::{Presentation, RenderService};

const GRAVITY: f32 = -9.81;

#[derive(Debug, Clone)]
struct Sphere {
    pose: Pose,
    radius: f32,
    gravity: bool,
    velocity: Vec3,
    impulses: Vec<Vec3>,
}

/// Physics made of spheres, with analytic ray casts
#[derive(Debug, Clone, Default)]
pub struct SpherePhysics {
    bodies: BTreeMap<BodyId, Sphere>,
    obstacles: Vec<(Vec3, f32)>,
}

/// Distance along `ray` to a sphere. A sphere the ray starts in is never hit.
fn intersect(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let c = oc.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let b = oc.dot(ray.direction);
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

impl SpherePhysics {
    pub fn add_body(&mut self, id: BodyId, position: Vec3, radius: f32) {
        self.bodies.insert(
            id,
            Sphere {
                pose: Pose::from_position(position),
                radius,
                gravity: false,
                velocity: Vec3::ZERO,
                impulses: Vec::new(),
            },
        );
    }

    /// Static geometry, only visible to [`QueryLayer::All`]
    pub fn add_obstacle(&mut self, center: Vec3, radius: f32) {
        self.obstacles.push((center, radius));
    }

    pub fn gravity_enabled(&self, id: BodyId) -> bool {
        self.bodies.get(&id).is_some_and(|body| body.gravity)
    }

    pub fn velocity(&self, id: BodyId) -> Vec3 {
        self.bodies.get(&id).map_or(Vec3::ZERO, |body| body.velocity)
    }

    pub fn impulses(&self, id: BodyId) -> Vec<Vec3> {
        self.bodies
            .get(&id)
            .map(|body| body.impulses.clone())
            .unwrap_or_default()
    }

    /// Integrate velocities, with gravity for bodies that have it
    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if body.gravity {
                body.velocity.y += GRAVITY * dt;
            }
            body.pose.position += body.velocity * dt;
        }
    }
}

impl PhysicsService for SpherePhysics {
    fn pose(&self, body: BodyId) -> Option<Pose> {
        self.bodies.get(&body).map(|sphere| sphere.pose)
    }

    fn set_pose(&mut self, body: BodyId, pose: Pose) {
        if let Some(sphere) = self.bodies.get_mut(&body) {
            sphere.pose = pose;
        }
    }

    fn set_gravity_enabled(&mut self, body: BodyId, enabled: bool) {
        if let Some(sphere) = self.bodies.get_mut(&body) {
            sphere.gravity = enabled;
        }
    }

    fn zero_velocity(&mut self, body: BodyId) {
        if let Some(sphere) = self.bodies.get_mut(&body) {
            sphere.velocity = Vec3::ZERO;
        }
    }

    fn apply_impulse(&mut self, body: BodyId, impulse: Vec3) {
        if let Some(sphere) = self.bodies.get_mut(&body) {
            sphere.velocity += impulse;
            sphere.impulses.push(impulse);
        }
    }

    fn cast_ray(
        &self,
        ray: &Ray,
        max_distance: f32,
        layer: QueryLayer,
        exclude: Option<BodyId>,
    ) -> Option<RayHit> {
        let bodies = self
            .bodies
            .iter()
            .filter(|(id, _)| Some(**id) != exclude)
            .filter_map(|(id, sphere)| {
                intersect(ray, sphere.pose.position, sphere.radius).map(|t| (Some(*id), t))
            });

        let statics = self
            .obstacles
            .iter()
            .filter(|_| layer == QueryLayer::All)
            .filter_map(|(center, radius)| intersect(ray, *center, *radius).map(|t| (None, t)));

        bodies
            .chain(statics)
            .filter(|(_, t)| *t <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(body, distance)| RayHit {
                body,
                distance,
                point: ray.at(distance),
            })
    }
}

/// Remembers what the rig told the renderer
#[derive(Debug, Default)]
pub struct RecordingRender {
    pub enabled: HashMap<CameraId, bool>,
    pub poses: Vec<(CameraId, Pose)>,
}

impl RecordingRender {
    /// Cameras currently enabled, sorted
    pub fn enabled_cameras(&self) -> Vec<CameraId> {
        let mut cameras: Vec<CameraId> = self
            .enabled
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(camera, _)| *camera)
            .collect();
        cameras.sort();
        cameras
    }
}

impl RenderService for RecordingRender {
    fn set_camera_enabled(&mut self, camera: CameraId, enabled: bool) {
        self.enabled.insert(camera, enabled);
    }

    fn set_camera_pose(&mut self, camera: CameraId, pose: Pose) {
        self.poses.push((camera, pose));
    }
}

/// Counts round outcomes
#[derive(Debug, Default)]
pub struct RecordingPresentation {
    pub wins: Vec<u32>,
    pub deaths: u32,
}

impl Presentation for RecordingPresentation {
    fn report_win(&mut self, level_id: u32) {
        self.wins.push(level_id);
    }

    fn report_death(&mut self) {
        self.deaths += 1;
    }
}
