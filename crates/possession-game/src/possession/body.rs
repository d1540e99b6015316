//! Possessable body records and their per-body watchdog state

use glam::Vec3;
use possession_core::{BodyId, Deadline, Pose};
use serde::{Deserialize, Serialize};

use crate::camera::ViewAnchor;
use crate::error::ConfigError;

/// Legal play volume: a floor and four axis-aligned walls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsPolicy {
    pub floor_y: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        Self {
            floor_y: -10.0,
            min_x: -100.0,
            max_x: 100.0,
            min_z: -100.0,
            max_z: 100.0,
        }
    }
}

impl BoundsPolicy {
    /// Whether a position is inside the play volume (planes count as inside)
    pub fn contains(&self, position: Vec3) -> bool {
        position.y >= self.floor_y
            && (self.min_x..=self.max_x).contains(&position.x)
            && (self.min_z..=self.max_z).contains(&position.z)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_x > self.max_x {
            return Err(ConfigError::InvertedRange {
                field: "bounds.min_x/max_x",
            });
        }
        if self.min_z > self.max_z {
            return Err(ConfigError::InvertedRange {
                field: "bounds.min_z/max_z",
            });
        }
        Ok(())
    }
}

/// What a body is, as far as the round is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyTag {
    /// An ordinary body
    #[default]
    Prop,
    /// Possessing this body wins the level
    Goal { level_id: u32 },
}

/// Where the camera goes when this body is possessed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyViews {
    pub first_person: ViewAnchor,
    pub third_person: ViewAnchor,
}

impl Default for BodyViews {
    fn default() -> Self {
        Self {
            first_person: ViewAnchor::tracked(Vec3::new(0.0, 0.5, 0.0), Vec3::ZERO),
            third_person: ViewAnchor::tracked(Vec3::new(0.0, 2.0, 5.0), Vec3::new(-15.0, 0.0, 0.0)),
        }
    }
}

/// Result of a body's activation watchdog firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Physics turned on: gravity plus a launch impulse
    Launch,
    /// The body is a goal: the level is won
    Win { level_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResetWatch {
    Idle,
    Waiting(Deadline),
}

/// A body the player can jump into
#[derive(Debug, Clone)]
pub struct PossessableBody {
    id: BodyId,
    /// Display name
    pub name: String,
    /// Role in the round
    pub tag: BodyTag,
    /// Pose captured at spawn
    reset_pose: Pose,
    /// Camera anchors used while this body is possessed
    pub views: BodyViews,
    /// Play volume override
    pub bounds: Option<BoundsPolicy>,
    /// Cooldown/reset timer override in seconds
    pub reset_timer: Option<f32>,
    /// Launch impulse magnitude override
    pub launch_impulse: Option<f32>,
    cooldown_active: bool,
    physics_enabled: bool,
    activation: Option<Deadline>,
    reset_watch: ResetWatch,
    out_of_bounds: bool,
}

impl PossessableBody {
    /// Create a body whose reset pose is its spawn pose
    pub fn new(id: BodyId, name: impl Into<String>, spawn: Pose) -> Self {
        Self {
            id,
            name: name.into(),
            tag: BodyTag::Prop,
            reset_pose: spawn,
            views: BodyViews::default(),
            bounds: None,
            reset_timer: None,
            launch_impulse: None,
            cooldown_active: false,
            physics_enabled: false,
            activation: None,
            reset_watch: ResetWatch::Idle,
            out_of_bounds: false,
        }
    }

    pub fn with_tag(mut self, tag: BodyTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_views(mut self, views: BodyViews) -> Self {
        self.views = views;
        self
    }

    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_reset_timer(mut self, seconds: f32) -> Self {
        self.reset_timer = Some(seconds);
        self
    }

    pub fn with_launch_impulse(mut self, magnitude: f32) -> Self {
        self.launch_impulse = Some(magnitude);
        self
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Pose captured at spawn
    pub fn reset_pose(&self) -> Pose {
        self.reset_pose
    }

    /// Between possession and activation
    pub fn cooldown_active(&self) -> bool {
        self.cooldown_active
    }

    /// Whether the core has turned gravity on for this body
    pub fn physics_enabled(&self) -> bool {
        self.physics_enabled
    }

    /// Whether a goal body
    pub fn is_goal(&self) -> bool {
        matches!(self.tag, BodyTag::Goal { .. })
    }

    /// Whether the body is waiting out its reset grace period
    pub fn reset_pending(&self) -> bool {
        matches!(self.reset_watch, ResetWatch::Waiting(_))
    }

    /// Start the post-possession cooldown; activation fires at `deadline`
    pub(crate) fn begin_cooldown(&mut self, deadline: Deadline) {
        self.cooldown_active = true;
        self.activation = Some(deadline);
        self.reset_watch = ResetWatch::Idle;
    }

    /// Activation watchdog. Fires once, when the cooldown deadline passes.
    pub(crate) fn poll_activation(&mut self, now: f64) -> Option<Activation> {
        if !self.cooldown_active {
            return None;
        }
        let deadline = self.activation?;
        if !deadline.is_due(now) {
            return None;
        }

        self.activation = None;
        self.cooldown_active = false;
        match self.tag {
            BodyTag::Goal { level_id } => Some(Activation::Win { level_id }),
            BodyTag::Prop => {
                self.physics_enabled = true;
                Some(Activation::Launch)
            }
        }
    }

    /// Whether `current` has moved away from the reset pose.
    ///
    /// Goals spin in place, so only their position counts.
    fn displaced(&self, current: &Pose, tolerance: f32) -> bool {
        match self.tag {
            BodyTag::Goal { .. } => current.position.distance(self.reset_pose.position) > tolerance,
            BodyTag::Prop => !current.approx_eq(&self.reset_pose, tolerance),
        }
    }

    /// Reset watchdog. Returns `true` when the body should be snapped back now.
    pub(crate) fn poll_reset(
        &mut self,
        now: f64,
        possessed: bool,
        current: &Pose,
        tolerance: f32,
        grace: f32,
    ) -> bool {
        if possessed {
            self.reset_watch = ResetWatch::Idle;
            return false;
        }

        match self.reset_watch {
            ResetWatch::Idle => {
                if self.displaced(current, tolerance) {
                    self.reset_watch = ResetWatch::Waiting(Deadline::after(now, grace));
                }
                false
            }
            ResetWatch::Waiting(deadline) => {
                if !deadline.is_due(now) {
                    return false;
                }
                self.reset_watch = ResetWatch::Idle;
                self.physics_enabled = false;
                true
            }
        }
    }

    /// Bounds watchdog. Returns `true` only on the tick a crossing episode starts.
    pub(crate) fn poll_bounds(&mut self, position: Vec3, bounds: &BoundsPolicy) -> bool {
        let outside = !bounds.contains(position);
        let crossed = outside && !self.out_of_bounds;
        self.out_of_bounds = outside;
        crossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crate_body() -> PossessableBody {
        PossessableBody::new(BodyId(1), "crate", Pose::from_position(Vec3::new(0.0, 1.0, 0.0)))
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = BoundsPolicy::default();
        assert!(bounds.contains(Vec3::ZERO));
        assert!(bounds.contains(Vec3::new(100.0, -10.0, -100.0)));
        assert!(!bounds.contains(Vec3::new(0.0, -10.5, 0.0)));
        assert!(!bounds.contains(Vec3::new(100.1, 0.0, 0.0)));
        assert!(!bounds.contains(Vec3::new(0.0, 0.0, -100.1)));
    }

    #[test]
    fn test_activation_launches_prop_once() {
        let mut body = crate_body();
        body.begin_cooldown(Deadline::after(0.0, 2.0));
        assert!(body.cooldown_active());

        assert_eq!(body.poll_activation(1.9), None);
        assert_eq!(body.poll_activation(2.0), Some(Activation::Launch));
        assert!(!body.cooldown_active());
        assert!(body.physics_enabled());
        assert_eq!(body.poll_activation(3.0), None);
    }

    #[test]
    fn test_activation_wins_on_goal() {
        let mut body = crate_body().with_tag(BodyTag::Goal { level_id: 4 });
        body.begin_cooldown(Deadline::after(0.0, 1.0));

        assert_eq!(body.poll_activation(1.0), Some(Activation::Win { level_id: 4 }));
        assert!(!body.cooldown_active());
        assert!(!body.physics_enabled());
    }

    #[test]
    fn test_reset_waits_for_grace_period() {
        let mut body = crate_body();
        let moved = Pose::from_position(Vec3::new(3.0, 0.0, 0.0));

        assert!(!body.poll_reset(0.0, false, &moved, 0.01, 2.0));
        assert!(body.reset_pending());
        assert!(!body.poll_reset(1.0, false, &moved, 0.01, 2.0));
        assert!(body.poll_reset(2.0, false, &moved, 0.01, 2.0));
        assert!(!body.reset_pending());
    }

    #[test]
    fn test_reset_cancelled_by_possession() {
        let mut body = crate_body();
        let moved = Pose::from_position(Vec3::new(3.0, 0.0, 0.0));

        body.poll_reset(0.0, false, &moved, 0.01, 2.0);
        assert!(!body.poll_reset(1.0, true, &moved, 0.01, 2.0));
        assert!(!body.reset_pending());

        // Abandoned again: the grace period starts over
        assert!(!body.poll_reset(2.5, false, &moved, 0.01, 2.0));
        assert!(!body.poll_reset(4.0, false, &moved, 0.01, 2.0));
        assert!(body.poll_reset(4.5, false, &moved, 0.01, 2.0));
    }

    #[test]
    fn test_resting_body_never_resets() {
        let mut body = crate_body();
        let home = body.reset_pose();
        for step in 0..100 {
            assert!(!body.poll_reset(step as f64, false, &home, 0.01, 2.0));
        }
    }

    #[test]
    fn test_spinning_goal_is_not_displaced() {
        let mut body = crate_body().with_tag(BodyTag::Goal { level_id: 1 });
        let spun = Pose::new(body.reset_pose().position, Vec3::new(0.0, 120.0, 0.0));
        assert!(!body.poll_reset(0.0, false, &spun, 0.01, 2.0));
        assert!(!body.reset_pending());
    }

    #[test]
    fn test_bounds_fire_once_per_episode() {
        let mut body = crate_body();
        let bounds = BoundsPolicy::default();
        let below = Vec3::new(0.0, -20.0, 0.0);

        assert!(body.poll_bounds(below, &bounds));
        assert!(!body.poll_bounds(below, &bounds));
        assert!(!body.poll_bounds(Vec3::ZERO, &bounds));
        assert!(body.poll_bounds(below, &bounds));
    }
}
