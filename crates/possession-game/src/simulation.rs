//! Per-frame scheduler
//!
//! [`Simulation::tick`] runs every routine once, always in the same order:
//!
//! 1. input and mode-request poll
//! 2. transition stepper (and idle tracking)
//! 3. camera-switch check, then the render pose sync
//! 4. possession click handling
//! 5. goal spinner and the activation, reset and bounds watchdogs

use glam::Vec3;
use possession_core::{BodyId, CameraId, GameTime, Pose};
use possession_physics::PhysicsService;
use tracing::{debug, info};

use crate::camera::{CameraMode, CameraRig, RigEvent};
use crate::config::SimulationConfig;
use crate::error::SetupError;
use crate::goal::GoalSpinner;
use crate::input::{InputAction, InputState};
use crate::possession::{PossessError, PossessableBody, PossessionController};
use crate::services::{Outcome, Presentation, RenderService};

/// What the host hands over when a level starts
#[derive(Debug, Clone)]
pub struct SceneSetup {
    /// Camera object rendering when no dedicated per-mode camera exists
    pub main_camera: CameraId,
    /// Where the camera starts
    pub camera_start: Pose,
    /// Dedicated camera per mode, in [`CameraMode::ALL`] order
    pub cameras: [Option<CameraId>; 3],
    pub bodies: Vec<PossessableBody>,
    /// Initially possessed body. When `None`, the body at the camera start is used.
    pub initial: Option<BodyId>,
}

/// Everything that happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub rig_events: Vec<RigEvent>,
    /// Result of this frame's possession click, if there was one
    pub possession: Option<Result<BodyId, PossessError>>,
    pub outcomes: Vec<Outcome>,
}

/// The camera rig and the possession controller, ticked together
#[derive(Debug)]
pub struct Simulation {
    time: GameTime,
    rig: CameraRig,
    possession: PossessionController,
    spinner: GoalSpinner,
    outcome: Option<Outcome>,
}

impl Simulation {
    pub fn new(
        config: SimulationConfig,
        setup: SceneSetup,
        physics: &dyn PhysicsService,
        render: &mut dyn RenderService,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        if setup.bodies.is_empty() {
            return Err(SetupError::NoBodies);
        }
        if let Some(missing) = setup.bodies.iter().find(|body| physics.pose(body.id()).is_none()) {
            return Err(SetupError::MissingPhysicsBody(missing.id()));
        }

        let initial = match setup.initial {
            Some(id) => id,
            None => PossessionController::find_initial(
                &setup.bodies,
                setup.camera_start.position,
                config.camera.anchor_epsilon,
            )
            .ok_or(SetupError::NoInitialBody)?,
        };

        let possession =
            PossessionController::new(config.possession.clone(), setup.bodies, initial)?;
        let mut rig = CameraRig::new(config.camera, setup.main_camera, setup.camera_start);
        for (mode, camera) in CameraMode::ALL.into_iter().zip(setup.cameras) {
            rig.assign_camera(mode, camera);
        }
        possession.bind_rig(&mut rig, physics)?;
        rig.bind_cameras(render);
        rig.sync_render(render);

        info!(
            "Simulation ready: {} bodies, starting in {}",
            possession.bodies().count(),
            initial
        );

        Ok(Self {
            time: GameTime::new(config.time),
            rig,
            spinner: GoalSpinner::new(config.possession.goal_spin_speed),
            possession,
            outcome: None,
        })
    }

    /// Advance one frame by `raw_delta` real seconds
    pub fn tick(
        &mut self,
        raw_delta: f32,
        input: &InputState,
        physics: &mut dyn PhysicsService,
        render: &mut dyn RenderService,
        presentation: &mut dyn Presentation,
    ) -> FrameReport {
        self.time.update(raw_delta);
        let dt = self.time.delta_time;
        let now = self.time.total_time;

        self.rig.poll_input(input, dt);

        let tracked = self.tracked_position(physics);
        self.rig.step_transition(dt, tracked);

        self.rig.switch_camera(render);
        self.rig.sync_render(render);

        let possession = if input.is_just_pressed(InputAction::Possess) {
            Some(self.handle_click(input, now, &*physics))
        } else {
            None
        };

        self.spinner.spin(dt, &self.possession, physics);
        let outcomes = self.possession.run_watchdogs(now, physics, presentation);
        if self.outcome.is_none() {
            self.outcome = outcomes.first().copied();
        }

        FrameReport {
            frame: self.time.frame_count,
            rig_events: self.rig.drain_events(),
            possession,
            outcomes,
        }
    }

    fn handle_click(
        &mut self,
        input: &InputState,
        now: f64,
        physics: &dyn PhysicsService,
    ) -> Result<BodyId, PossessError> {
        let ray = input
            .pick_ray
            .or_else(|| self.rig.cursor_ray(input.cursor))
            .ok_or(PossessError::NoTarget)?;

        let result = self
            .possession
            .attempt_possess(&ray, now, physics, &mut self.rig);
        if let Err(err) = &result {
            debug!("Possession rejected: {}", err);
        }
        result
    }

    fn tracked_position(&self, physics: &dyn PhysicsService) -> Option<Vec3> {
        self.rig
            .tracked_body()
            .and_then(|body| physics.pose(body))
            .map(|pose| pose.position)
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn possession(&self) -> &PossessionController {
        &self.possession
    }

    pub fn time(&self) -> &GameTime {
        &self.time
    }

    /// Pause or resume simulated time
    pub fn set_paused(&mut self, paused: bool) {
        if paused {
            self.time.pause();
        } else {
            self.time.resume();
        }
    }

    /// The first round-ending outcome, once one has happened
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
}
