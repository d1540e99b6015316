//! JSON level layouts
//!
//! A layout lists the possessable bodies, static obstacles and the camera
//! start. Building one registers everything with the physics world and
//! produces the [`SceneSetup`] the simulation starts from.

use std::collections::HashSet;

use glam::Vec3;
use possession_core::{BodyId, CameraId, Pose};
use possession_game::{BodyTag, BodyViews, BoundsPolicy, PossessableBody, SceneSetup};
use possession_physics::PhysicsWorld;
use serde::{Deserialize, Serialize};
use tracing::info;

/// The level shipped with the binary
const COURTYARD: &str = include_str!("../assets/levels/courtyard.json");

/// Camera object the renderer starts with
const MAIN_CAMERA: CameraId = CameraId(0);

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("invalid level layout: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("level '{0}' has no bodies")]
    NoBodies(String),

    #[error("duplicate body id {0}")]
    DuplicateBody(u32),

    #[error("bodies {0} and {1} are both marked initial")]
    MultipleInitial(u32, u32),

    #[error("level '{0}' has neither a camera start nor an initial body")]
    NoCameraStart(String),
}

/// A possessable body as authored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyLayout {
    pub id: u32,
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub orientation: Vec3,
    #[serde(default = "default_half_extents")]
    pub half_extents: Vec3,
    #[serde(default)]
    pub tag: BodyTag,
    #[serde(default)]
    pub initial: bool,
    #[serde(default)]
    pub views: Option<BodyViews>,
    #[serde(default)]
    pub bounds: Option<BoundsPolicy>,
    #[serde(default)]
    pub reset_timer: Option<f32>,
    #[serde(default)]
    pub launch_impulse: Option<f32>,
}

fn default_half_extents() -> Vec3 {
    Vec3::splat(0.5)
}

impl BodyLayout {
    fn spawn_pose(&self) -> Pose {
        Pose::new(self.position, self.orientation)
    }

    fn to_body(&self) -> PossessableBody {
        let mut body = PossessableBody::new(BodyId(self.id), self.name.clone(), self.spawn_pose())
            .with_tag(self.tag);
        if let Some(views) = self.views {
            body = body.with_views(views);
        }
        if let Some(bounds) = self.bounds {
            body = body.with_bounds(bounds);
        }
        if let Some(timer) = self.reset_timer {
            body = body.with_reset_timer(timer);
        }
        if let Some(impulse) = self.launch_impulse {
            body = body.with_launch_impulse(impulse);
        }
        body
    }
}

/// Static box obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleLayout {
    pub center: Vec3,
    pub half_extents: Vec3,
}

/// A whole level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    pub id: u32,
    pub name: String,
    /// Ground plane height, if the level has a floor
    #[serde(default)]
    pub ground_y: Option<f32>,
    /// Camera start; defaults to the initial body's first-person view
    #[serde(default)]
    pub camera_start: Option<Pose>,
    /// Dedicated camera object ids per mode (first-person, third-person, God)
    #[serde(default)]
    pub cameras: [Option<u32>; 3],
    #[serde(default)]
    pub obstacles: Vec<ObstacleLayout>,
    pub bodies: Vec<BodyLayout>,
}

impl LevelLayout {
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The courtyard level bundled with the binary
    pub fn bundled() -> Result<Self, LevelError> {
        Self::from_json(COURTYARD)
    }

    /// Id of the body with the given name
    pub fn body_id(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .find(|body| body.name == name)
            .map(|body| BodyId(body.id))
    }

    fn initial_body(&self) -> Result<Option<&BodyLayout>, LevelError> {
        let mut initial: Option<&BodyLayout> = None;
        for body in self.bodies.iter().filter(|body| body.initial) {
            if let Some(first) = initial {
                return Err(LevelError::MultipleInitial(first.id, body.id));
            }
            initial = Some(body);
        }
        Ok(initial)
    }

    /// Register the level with `physics` and describe it for the simulation
    pub fn build(&self, physics: &mut PhysicsWorld) -> Result<SceneSetup, LevelError> {
        if self.bodies.is_empty() {
            return Err(LevelError::NoBodies(self.name.clone()));
        }
        let mut seen = HashSet::new();
        for body in &self.bodies {
            if !seen.insert(body.id) {
                return Err(LevelError::DuplicateBody(body.id));
            }
        }

        let initial = self.initial_body()?;
        let camera_start = match (self.camera_start, initial) {
            (Some(pose), _) => pose,
            (None, Some(body)) => body
                .views
                .unwrap_or_default()
                .first_person
                .resolve(Some(body.position)),
            (None, None) => return Err(LevelError::NoCameraStart(self.name.clone())),
        };

        if let Some(y) = self.ground_y {
            physics.create_ground(y);
        }
        for obstacle in &self.obstacles {
            physics.create_static_box(obstacle.half_extents, obstacle.center);
        }
        for body in &self.bodies {
            physics.add_possessable_body(BodyId(body.id), body.spawn_pose(), body.half_extents);
        }

        info!(
            "Built level {} '{}': {} bodies, {} obstacles",
            self.id,
            self.name,
            self.bodies.len(),
            self.obstacles.len()
        );

        Ok(SceneSetup {
            main_camera: MAIN_CAMERA,
            camera_start,
            cameras: self.cameras.map(|camera| camera.map(CameraId)),
            bodies: self.bodies.iter().map(BodyLayout::to_body).collect(),
            initial: initial.map(|body| BodyId(body.id)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use possession_physics::PhysicsService;

    #[test]
    fn test_bundled_level_builds() {
        let layout = LevelLayout::bundled().unwrap();
        let mut physics = PhysicsWorld::new();
        let setup = layout.build(&mut physics).unwrap();

        assert_eq!(setup.bodies.len(), layout.bodies.len());
        assert!(setup.initial.is_some());
        assert!(setup.bodies.iter().any(|body| body.is_goal()));
        for body in &setup.bodies {
            assert!(physics.pose(body.id()).is_some());
        }
    }

    #[test]
    fn test_camera_start_defaults_to_initial_view() {
        let text = r#"{
            "id": 2,
            "name": "test",
            "bodies": [
                { "id": 5, "name": "box", "position": [1.0, 0.5, 0.0], "initial": true }
            ]
        }"#;
        let layout = LevelLayout::from_json(text).unwrap();
        let setup = layout.build(&mut PhysicsWorld::new()).unwrap();
        assert_eq!(setup.camera_start.position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(setup.initial, Some(BodyId(5)));
        assert_eq!(layout.body_id("box"), Some(BodyId(5)));
    }

    #[test]
    fn test_goal_tag_parses() {
        let text = r#"{
            "id": 3,
            "name": "goal",
            "camera_start": { "position": [0.0, 1.0, 0.0], "orientation": [0.0, 0.0, 0.0] },
            "bodies": [
                { "id": 1, "name": "idol", "position": [0.0, 0.5, -4.0], "tag": { "Goal": { "level_id": 3 } } }
            ]
        }"#;
        let layout = LevelLayout::from_json(text).unwrap();
        assert_eq!(layout.bodies[0].tag, BodyTag::Goal { level_id: 3 });
    }

    #[test]
    fn test_layout_errors() {
        let duplicate = r#"{
            "id": 1, "name": "dup",
            "camera_start": { "position": [0.0, 0.0, 0.0], "orientation": [0.0, 0.0, 0.0] },
            "bodies": [
                { "id": 1, "name": "a", "position": [0.0, 0.0, 0.0] },
                { "id": 1, "name": "b", "position": [2.0, 0.0, 0.0] }
            ]
        }"#;
        let layout = LevelLayout::from_json(duplicate).unwrap();
        assert!(matches!(
            layout.build(&mut PhysicsWorld::new()),
            Err(LevelError::DuplicateBody(1))
        ));

        let no_start = r#"{ "id": 1, "name": "lost", "bodies": [ { "id": 1, "name": "a", "position": [0.0, 0.0, 0.0] } ] }"#;
        let layout = LevelLayout::from_json(no_start).unwrap();
        assert!(matches!(
            layout.build(&mut PhysicsWorld::new()),
            Err(LevelError::NoCameraStart(_))
        ));

        assert!(matches!(LevelLayout::from_json("{"), Err(LevelError::Parse(_))));
    }
}
