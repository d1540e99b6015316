//! Possession controller: who the player is, and how that changes

use std::collections::BTreeMap;

use glam::Vec3;
use possession_core::{BodyId, Deadline, Pose, Ray};
use possession_physics::{PhysicsService, QueryLayer};
use tracing::{debug, info};

use crate::camera::{CameraMode, CameraRig};
use crate::error::SetupError;
use crate::services::{Outcome, Presentation};

use super::{Activation, PossessError, PossessableBody, PossessionConfig};

/// Owns every possessable body and the single possessed slot
#[derive(Debug, Clone)]
pub struct PossessionController {
    config: PossessionConfig,
    bodies: BTreeMap<BodyId, PossessableBody>,
    possessed: BodyId,
}

impl PossessionController {
    /// Take ownership of the scene's bodies with `initial` possessed.
    ///
    /// The initial body starts without a cooldown and with physics off.
    pub fn new(
        config: PossessionConfig,
        bodies: Vec<PossessableBody>,
        initial: BodyId,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        if bodies.is_empty() {
            return Err(SetupError::NoBodies);
        }

        let mut by_id = BTreeMap::new();
        for body in bodies {
            let id = body.id();
            if by_id.insert(id, body).is_some() {
                return Err(SetupError::DuplicateBody(id));
            }
        }
        if !by_id.contains_key(&initial) {
            return Err(SetupError::UnknownInitialBody(initial));
        }

        Ok(Self {
            config,
            bodies: by_id,
            possessed: initial,
        })
    }

    /// The body whose spawn position is closest to `camera_position`, within `tolerance`
    pub fn find_initial(
        bodies: &[PossessableBody],
        camera_position: Vec3,
        tolerance: f32,
    ) -> Option<BodyId> {
        bodies
            .iter()
            .map(|body| (body.id(), body.reset_pose().position.distance(camera_position)))
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    pub fn config(&self) -> &PossessionConfig {
        &self.config
    }

    /// The currently possessed body
    pub fn possessed(&self) -> BodyId {
        self.possessed
    }

    pub fn body(&self, id: BodyId) -> Option<&PossessableBody> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut PossessableBody> {
        self.bodies.get_mut(&id)
    }

    /// All bodies in id order
    pub fn bodies(&self) -> impl Iterator<Item = &PossessableBody> {
        self.bodies.values()
    }

    /// Point the rig's body views at the possessed body and start tracking it
    pub fn bind_rig(
        &self,
        rig: &mut CameraRig,
        physics: &dyn PhysicsService,
    ) -> Result<(), SetupError> {
        let body = self
            .bodies
            .get(&self.possessed)
            .ok_or(SetupError::UnknownInitialBody(self.possessed))?;
        let pose = physics
            .pose(self.possessed)
            .ok_or(SetupError::MissingPhysicsBody(self.possessed))?;

        rig.set_anchor(CameraMode::FirstPerson, body.views.first_person);
        rig.set_anchor(CameraMode::ThirdPerson, body.views.third_person);
        rig.track(self.possessed, pose.position);
        Ok(())
    }

    /// Try to move player control to whatever `click` points at.
    ///
    /// On success the rig is rebound to the target's views and asked for
    /// first-person; the previously possessed body is left as it is.
    pub fn attempt_possess(
        &mut self,
        click: &Ray,
        now: f64,
        physics: &dyn PhysicsService,
        rig: &mut CameraRig,
    ) -> Result<BodyId, PossessError> {
        let target = physics
            .cast_ray(click, f32::MAX, QueryLayer::Possession, None)
            .and_then(|hit| hit.body)
            .ok_or(PossessError::NoTarget)?;

        if target == self.possessed {
            return Err(PossessError::AlreadyPossessed(target));
        }

        let current = self
            .bodies
            .get(&self.possessed)
            .ok_or(PossessError::UnknownBody(self.possessed))?;
        if current.cooldown_active() {
            return Err(PossessError::OnCooldown(self.possessed));
        }
        if !self.bodies.contains_key(&target) {
            return Err(PossessError::UnknownBody(target));
        }

        let from = physics
            .pose(self.possessed)
            .ok_or(PossessError::UnknownBody(self.possessed))?;
        let to = physics
            .pose(target)
            .ok_or(PossessError::UnknownBody(target))?;
        self.check_line_of_sight(&from, &to, target, physics)?;

        let grace = self.timer_for(target);
        let body = self
            .bodies
            .get_mut(&target)
            .ok_or(PossessError::UnknownBody(target))?;
        body.begin_cooldown(Deadline::after(now, grace));

        rig.set_anchor(CameraMode::FirstPerson, body.views.first_person);
        rig.set_anchor(CameraMode::ThirdPerson, body.views.third_person);
        rig.track(target, to.position);
        rig.request_mode(CameraMode::FirstPerson);

        info!(
            "Possessed {} '{}' (was {}), activating in {:.1}s",
            target, body.name, self.possessed, grace
        );
        self.possessed = target;
        Ok(target)
    }

    /// The first thing a ray from the possessed body meets must be the target, within range
    fn check_line_of_sight(
        &self,
        from: &Pose,
        to: &Pose,
        target: BodyId,
        physics: &dyn PhysicsService,
    ) -> Result<(), PossessError> {
        let Some((ray, _)) = Ray::between(from.position, to.position) else {
            // Coincident bodies can always see each other
            return Ok(());
        };

        let max_distance = self.config.possess_distance;
        match physics.cast_ray(&ray, max_distance, QueryLayer::All, Some(self.possessed)) {
            None => Err(PossessError::TooFar {
                target,
                max_distance,
            }),
            Some(hit) if hit.body == Some(target) => Ok(()),
            Some(hit) => Err(PossessError::Obstructed {
                target,
                blocker: hit.body,
            }),
        }
    }

    fn timer_for(&self, id: BodyId) -> f32 {
        self.bodies
            .get(&id)
            .and_then(|body| body.reset_timer)
            .unwrap_or(self.config.reset_timer)
    }

    /// Run the activation, reset and bounds watchdogs for every body.
    ///
    /// Outcomes are reported to `presentation` and also returned.
    pub fn run_watchdogs(
        &mut self,
        now: f64,
        physics: &mut dyn PhysicsService,
        presentation: &mut dyn Presentation,
    ) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        let config = &self.config;
        let possessed = self.possessed;

        for (&id, body) in self.bodies.iter_mut() {
            let is_possessed = id == possessed;

            match body.poll_activation(now) {
                Some(Activation::Launch) => {
                    let magnitude = body.launch_impulse.unwrap_or(config.activation_impulse);
                    let forward = physics.pose(id).map_or(Vec3::NEG_Z, |pose| pose.forward());
                    physics.set_gravity_enabled(id, true);
                    physics.apply_impulse(id, forward * magnitude);
                    debug!("{} activated with impulse {:.2}", id, magnitude);
                }
                Some(Activation::Win { level_id }) => {
                    info!("Goal {} reached, level {} won", id, level_id);
                    outcomes.push(Outcome::Win { level_id });
                }
                None => {}
            }

            let Some(pose) = physics.pose(id) else {
                continue;
            };

            let grace = body.reset_timer.unwrap_or(config.reset_timer);
            if body.poll_reset(now, is_possessed, &pose, config.pose_tolerance, grace) {
                physics.set_gravity_enabled(id, false);
                physics.zero_velocity(id);
                physics.set_pose(id, body.reset_pose());
                debug!("{} abandoned, reset to spawn", id);
            }

            if is_possessed {
                let bounds = body.bounds.unwrap_or(config.bounds);
                if body.poll_bounds(pose.position, &bounds) {
                    info!("{} left the play volume at {:?}", id, pose.position);
                    outcomes.push(Outcome::Death { body: id });
                }
            }
        }

        for outcome in &outcomes {
            outcome.report(presentation);
        }
        outcomes
    }
}
