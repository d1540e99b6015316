//! Possession Physics - Physics boundary for the possession rig
//!
//! Defines the [`PhysicsService`] trait the simulation core calls into, and
//! [`PhysicsWorld`], an implementation on top of rapier3d with a dedicated
//! collision group for possessable bodies.

pub mod convert;
mod service;

pub use service::{PhysicsService, QueryLayer, RayHit};

use std::collections::HashMap;

use glam::Vec3;
use nalgebra::Unit;
use possession_core::{BodyId, Pose, Ray};
use rapier3d::parry::query::PointQuery;
use rapier3d::prelude::*;
use tracing::debug;

/// Membership group of every collider the world creates
pub const WORLD_GROUP: Group = Group::GROUP_1;
/// Membership group of possessable bodies (the "possession layer")
pub const POSSESSION_GROUP: Group = Group::GROUP_10;

/// Physics world configuration
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec3,
    /// Physics timestep (default: 1/60)
    pub timestep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 60.0,
        }
    }
}

/// Rapier handles backing one possessable body
#[derive(Debug, Clone, Copy)]
pub struct BodyHandles {
    pub rigid_body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// The physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,
    /// Impulse joint storage
    pub impulse_joint_set: ImpulseJointSet,
    /// Multi-body joint storage
    pub multibody_joint_set: MultibodyJointSet,

    /// Possessable bodies by id
    bodies: HashMap<BodyId, BodyHandles>,
    /// Reverse lookup from collider to body id
    owners: HashMap<ColliderHandle, BodyId>,

    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            bodies: HashMap::new(),
            owners: HashMap::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation
    pub fn step(&mut self) {
        let gravity = convert::vector(self.config.gravity);

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a possessable cuboid body.
    ///
    /// Bodies spawn with gravity off; the possession protocol turns it on.
    pub fn add_possessable_body(&mut self, id: BodyId, pose: Pose, half_extents: Vec3) -> BodyHandles {
        let rigid_body = RigidBodyBuilder::dynamic()
            .position(convert::isometry(&pose))
            .gravity_scale(0.0)
            .build();
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .collision_groups(InteractionGroups::new(
                WORLD_GROUP | POSSESSION_GROUP,
                Group::ALL,
            ))
            .friction(0.7)
            .build();

        let rb_handle = self.rigid_body_set.insert(rigid_body);
        let col_handle =
            self.collider_set
                .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);
        let handles = BodyHandles {
            rigid_body: rb_handle,
            collider: col_handle,
        };

        self.bodies.insert(id, handles);
        self.owners.insert(col_handle, id);
        self.query_pipeline.update(&self.collider_set);
        debug!("Registered {} with the physics world", id);
        handles
    }

    /// Add a static collider (ground, walls, obstacles)
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        let handle = self.collider_set.insert(collider);
        self.query_pipeline.update(&self.collider_set);
        handle
    }

    /// Create a ground plane collider
    pub fn create_ground(&mut self, y: f32) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .collision_groups(InteractionGroups::new(WORLD_GROUP, Group::ALL))
            .friction(0.7)
            .restitution(0.0)
            .build();
        self.add_static_collider(ground)
    }

    /// Create a static box collider
    pub fn create_static_box(&mut self, half_extents: Vec3, position: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(convert::vector(position))
            .collision_groups(InteractionGroups::new(WORLD_GROUP, Group::ALL))
            .friction(0.7)
            .build();
        self.add_static_collider(collider)
    }

    /// Handles of a registered body
    pub fn handles(&self, id: BodyId) -> Option<BodyHandles> {
        self.bodies.get(&id).copied()
    }

    /// Whether a body's gravity is currently enabled
    pub fn gravity_enabled(&self, id: BodyId) -> bool {
        self.handles(id)
            .and_then(|h| self.rigid_body_set.get(h.rigid_body))
            .is_some_and(|rb| rb.gravity_scale() != 0.0)
    }

    /// Current linear velocity of a body
    pub fn linear_velocity(&self, id: BodyId) -> Option<Vec3> {
        let handles = self.handles(id)?;
        let rb = self.rigid_body_set.get(handles.rigid_body)?;
        Some(convert::vec3(rb.linvel()))
    }

    fn rigid_body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let handles = self.bodies.get(&id)?;
        self.rigid_body_set.get_mut(handles.rigid_body)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsService for PhysicsWorld {
    fn pose(&self, body: BodyId) -> Option<Pose> {
        let handles = self.handles(body)?;
        let rb = self.rigid_body_set.get(handles.rigid_body)?;
        Some(convert::pose(rb.position()))
    }

    fn set_pose(&mut self, body: BodyId, pose: Pose) {
        let Some(handles) = self.handles(body) else {
            return;
        };
        let iso = convert::isometry(&pose);
        if let Some(rb) = self.rigid_body_set.get_mut(handles.rigid_body) {
            rb.set_position(iso, true);
        }
        // Colliders follow their parent on the next step; queries need it now.
        if let Some(collider) = self.collider_set.get_mut(handles.collider) {
            collider.set_position(iso);
        }
        self.query_pipeline.update(&self.collider_set);
    }

    fn set_gravity_enabled(&mut self, body: BodyId, enabled: bool) {
        if let Some(rb) = self.rigid_body_mut(body) {
            rb.set_gravity_scale(if enabled { 1.0 } else { 0.0 }, true);
        }
    }

    fn zero_velocity(&mut self, body: BodyId) {
        if let Some(rb) = self.rigid_body_mut(body) {
            rb.set_linvel(vector![0.0, 0.0, 0.0], true);
            rb.set_angvel(vector![0.0, 0.0, 0.0], true);
        }
    }

    fn apply_impulse(&mut self, body: BodyId, impulse: Vec3) {
        if let Some(rb) = self.rigid_body_mut(body) {
            rb.apply_impulse(convert::vector(impulse), true);
        }
    }

    fn cast_ray(
        &self,
        ray: &Ray,
        max_distance: f32,
        layer: QueryLayer,
        exclude: Option<BodyId>,
    ) -> Option<RayHit> {
        // Colliders the ray starts in are not hits
        let origin = convert::point(ray.origin);
        let outside = |_: ColliderHandle, collider: &Collider| {
            !collider.shape().contains_point(collider.position(), &origin)
        };

        let mut filter = match layer {
            QueryLayer::Possession => {
                QueryFilter::default().groups(InteractionGroups::new(Group::ALL, POSSESSION_GROUP))
            }
            QueryLayer::All => QueryFilter::default(),
        }
        .predicate(&outside);
        if let Some(handles) = exclude.and_then(|id| self.handles(id)) {
            filter = filter.exclude_rigid_body(handles.rigid_body);
        }

        let rapier_ray = rapier3d::prelude::Ray::new(origin, convert::vector(ray.direction));

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &rapier_ray,
                max_distance,
                true,
                filter,
            )
            .map(|(handle, toi)| RayHit {
                body: self.owners.get(&handle).copied(),
                distance: toi,
                point: ray.at(toi),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(origin: Vec3, direction: Vec3) -> Ray {
        Ray::new(origin, direction).unwrap()
    }

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.config.gravity, Vec3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn test_body_registration() {
        let mut world = PhysicsWorld::new();
        let id = BodyId(1);
        world.add_possessable_body(id, Pose::from_position(Vec3::new(0.0, 2.0, 0.0)), Vec3::splat(0.5));

        let pose = world.pose(id).unwrap();
        assert!((pose.position - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
        assert!(!world.gravity_enabled(id));
        assert!(world.pose(BodyId(99)).is_none());
    }

    #[test]
    fn test_possession_layer_skips_static_geometry() {
        let mut world = PhysicsWorld::new();
        let id = BodyId(1);
        world.create_static_box(Vec3::splat(0.5), Vec3::new(0.0, 0.0, -3.0));
        world.add_possessable_body(id, Pose::from_position(Vec3::new(0.0, 0.0, -6.0)), Vec3::splat(0.5));

        let pick = ray(Vec3::ZERO, Vec3::NEG_Z);

        let hit = world.cast_ray(&pick, 100.0, QueryLayer::Possession, None).unwrap();
        assert_eq!(hit.body, Some(id));
        assert!((hit.distance - 5.5).abs() < 1e-3);

        let hit = world.cast_ray(&pick, 100.0, QueryLayer::All, None).unwrap();
        assert_eq!(hit.body, None);
        assert!((hit.distance - 2.5).abs() < 1e-3);
    }

    #[test]
    fn test_excluded_body_is_ignored() {
        let mut world = PhysicsWorld::new();
        let a = BodyId(1);
        let b = BodyId(2);
        world.add_possessable_body(a, Pose::default(), Vec3::splat(0.5));
        world.add_possessable_body(b, Pose::from_position(Vec3::new(4.0, 0.0, 0.0)), Vec3::splat(0.5));

        let from_a = ray(Vec3::ZERO, Vec3::X);
        let hit = world.cast_ray(&from_a, 10.0, QueryLayer::All, Some(a)).unwrap();
        assert_eq!(hit.body, Some(b));

        assert!(world.cast_ray(&from_a, 2.0, QueryLayer::All, Some(a)).is_none());
    }

    #[test]
    fn test_ray_ignores_collider_containing_origin() {
        let mut world = PhysicsWorld::new();
        let a = BodyId(1);
        let b = BodyId(2);
        world.add_possessable_body(a, Pose::default(), Vec3::splat(0.5));
        world.add_possessable_body(b, Pose::from_position(Vec3::new(0.0, 0.0, -6.0)), Vec3::splat(0.5));

        // From the top face of `a`, aimed down through it at `b`
        let eye = Vec3::new(0.0, 0.5, 0.0);
        let look = ray(eye, Vec3::new(0.0, 0.0, -6.0) - eye);
        let hit = world.cast_ray(&look, 100.0, QueryLayer::Possession, None).unwrap();
        assert_eq!(hit.body, Some(b));
        assert!(hit.distance > 5.0);

        let straight_down = ray(Vec3::new(0.0, 0.2, 0.0), Vec3::NEG_Y);
        assert!(world.cast_ray(&straight_down, 100.0, QueryLayer::All, None).is_none());
    }

    #[test]
    fn test_gravity_toggle() {
        let mut world = PhysicsWorld::new();
        let id = BodyId(1);
        world.add_possessable_body(id, Pose::from_position(Vec3::new(0.0, 10.0, 0.0)), Vec3::splat(0.5));

        for _ in 0..10 {
            world.step();
        }
        assert!((world.pose(id).unwrap().position.y - 10.0).abs() < 1e-4);

        world.set_gravity_enabled(id, true);
        for _ in 0..10 {
            world.step();
        }
        assert!(world.pose(id).unwrap().position.y < 10.0);

        world.zero_velocity(id);
        assert_eq!(world.linear_velocity(id), Some(Vec3::ZERO));
    }

    #[test]
    fn test_set_pose_moves_queries() {
        let mut world = PhysicsWorld::new();
        let id = BodyId(1);
        world.add_possessable_body(id, Pose::from_position(Vec3::new(0.0, 0.0, -5.0)), Vec3::splat(0.5));
        world.set_pose(id, Pose::from_position(Vec3::new(10.0, 0.0, 0.0)));

        let pick = ray(Vec3::ZERO, Vec3::NEG_Z);
        assert!(world.cast_ray(&pick, 100.0, QueryLayer::Possession, None).is_none());

        let pick = ray(Vec3::ZERO, Vec3::X);
        let hit = world.cast_ray(&pick, 100.0, QueryLayer::Possession, None).unwrap();
        assert_eq!(hit.body, Some(id));
    }
}
