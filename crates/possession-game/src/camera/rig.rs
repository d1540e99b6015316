//! Camera rig: three named views and the eased transition between them
//!
//! The rig is either idle in a mode or flying towards a pending mode's
//! anchor. Each frame the scheduler calls, in order:
//! [`CameraRig::poll_input`], [`CameraRig::step_transition`],
//! [`CameraRig::switch_camera`] and [`CameraRig::sync_render`].

use glam::{Vec2, Vec3};
use possession_core::{BodyId, CameraId, Pose, Ray};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input::{InputAction, InputState};
use crate::services::RenderService;

use super::{ease, AnchorSpace, CameraConfig, TrackingPolicy, ViewAnchor};

/// The three named viewpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMode {
    FirstPerson,
    ThirdPerson,
    God,
}

impl CameraMode {
    pub const ALL: [CameraMode; 3] = [
        CameraMode::FirstPerson,
        CameraMode::ThirdPerson,
        CameraMode::God,
    ];

    fn index(self) -> usize {
        match self {
            CameraMode::FirstPerson => 0,
            CameraMode::ThirdPerson => 1,
            CameraMode::God => 2,
        }
    }
}

/// Something the rig did this frame, drained by the scheduler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RigEvent {
    /// A transition towards `to` began
    TransitionStarted { from: CameraMode, to: CameraMode },
    /// A transition finished and the rig settled in `mode`
    TransitionFinished { mode: CameraMode },
    /// A mode request failed the start guard and was dropped
    RequestDiscarded { requested: CameraMode },
    /// A transition had no distance to cover and completed its travel at once
    DegenerateTransition { to: CameraMode },
    /// The rendered camera object was cut over
    CameraSwitched { from: CameraId, to: CameraId },
}

/// An in-flight transition
#[derive(Debug, Clone, Copy)]
struct Transition {
    to: CameraMode,
    start: Pose,
    target: Pose,
    move_distance: f32,
    rotate_angle: f32,
    travel_fraction: f32,
    rotate_fraction: f32,
}

impl Transition {
    fn is_complete(&self) -> bool {
        self.travel_fraction >= 1.0 && self.rotate_fraction >= 1.0
    }
}

/// Advance a fraction by `speed * dt / span`, treating a zero span as arrived
fn advance_fraction(fraction: f32, span: f32, speed: f32, dt: f32) -> f32 {
    if span <= f32::EPSILON {
        return 1.0;
    }
    (fraction + dt * speed / span).clamp(0.0, 1.0)
}

/// Camera rig with per-mode view anchors and optional per-mode camera objects
#[derive(Debug, Clone)]
pub struct CameraRig {
    /// Configuration
    pub config: CameraConfig,
    /// Current settled mode
    mode: CameraMode,
    /// Requested mode consumed by the transition stepper
    pending: Option<CameraMode>,
    /// Request that arrived while a transition was in flight
    queued: Option<CameraMode>,
    /// Target anchor per mode
    anchors: [ViewAnchor; 3],
    /// Dedicated camera object per mode
    cameras: [Option<CameraId>; 3],
    /// Camera object currently rendering
    active_camera: CameraId,
    /// Current camera pose
    pose: Pose,
    /// Orientation recorded when the last transition settled
    settled_orientation: Vec3,
    transition: Option<Transition>,
    /// Body the rig follows (not owned)
    tracked: Option<BodyId>,
    /// Camera position relative to the tracked body
    offset: Vec3,
    events: Vec<RigEvent>,
}

impl CameraRig {
    /// Create a rig settled in first-person at `start`, rendering through `main_camera`.
    ///
    /// The first-person anchor starts at `start`; third-person sits behind and
    /// above it; the God anchor comes from the config.
    pub fn new(config: CameraConfig, main_camera: CameraId, start: Pose) -> Self {
        let anchors = [
            ViewAnchor::world(start.position, start.orientation),
            ViewAnchor::world(start.position + Vec3::new(0.0, 2.0, 5.0), start.orientation),
            config.god_anchor,
        ];

        Self {
            config,
            mode: CameraMode::FirstPerson,
            pending: None,
            queued: None,
            anchors,
            cameras: [None; 3],
            active_camera: main_camera,
            pose: start,
            settled_orientation: start.orientation,
            transition: None,
            tracked: None,
            offset: Vec3::ZERO,
            events: Vec::new(),
        }
    }

    /// Current settled mode
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Requested mode not yet consumed
    pub fn pending_mode(&self) -> Option<CameraMode> {
        self.pending
    }

    /// Current camera pose
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Current camera position
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    /// Orientation recorded at the last settle
    pub fn settled_orientation(&self) -> Vec3 {
        self.settled_orientation
    }

    /// Camera object currently rendering
    pub fn active_camera(&self) -> CameraId {
        self.active_camera
    }

    /// Position progress of the in-flight transition (1 when idle)
    pub fn travel_fraction(&self) -> f32 {
        self.transition.map_or(1.0, |t| t.travel_fraction)
    }

    /// Rotation progress of the in-flight transition (1 when idle)
    pub fn rotate_fraction(&self) -> f32 {
        self.transition.map_or(1.0, |t| t.rotate_fraction)
    }

    /// No transition in flight
    pub fn is_idle(&self) -> bool {
        self.transition.is_none()
    }

    /// Body being followed, if any
    pub fn tracked_body(&self) -> Option<BodyId> {
        self.tracked
    }

    /// Camera position relative to the tracked body
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Anchor for a mode
    pub fn anchor(&self, mode: CameraMode) -> ViewAnchor {
        self.anchors[mode.index()]
    }

    /// Dedicated camera object for a mode
    pub fn camera(&self, mode: CameraMode) -> Option<CameraId> {
        self.cameras[mode.index()]
    }

    /// Rebind a mode's anchor (takes effect on the next transition)
    pub fn set_anchor(&mut self, mode: CameraMode, anchor: ViewAnchor) {
        self.anchors[mode.index()] = anchor;
    }

    /// Assign or clear a mode's dedicated camera object
    pub fn assign_camera(&mut self, mode: CameraMode, camera: Option<CameraId>) {
        self.cameras[mode.index()] = camera;
    }

    /// Enable the current mode's camera and disable the others.
    ///
    /// A mode without a dedicated camera keeps rendering through the active one.
    pub fn bind_cameras(&mut self, render: &mut dyn RenderService) {
        let current = self.camera(self.mode).unwrap_or(self.active_camera);
        for camera in self.cameras.iter().flatten() {
            if *camera != current {
                render.set_camera_enabled(*camera, false);
            }
        }
        render.set_camera_enabled(current, true);
        self.active_camera = current;
    }

    /// Follow a body, keeping the current camera-to-body offset
    pub fn track(&mut self, body: BodyId, body_position: Vec3) {
        self.tracked = Some(body);
        self.offset = self.pose.position - body_position;
    }

    /// Ask for a mode. Requests made mid-transition wait for it to finish.
    pub fn request_mode(&mut self, mode: CameraMode) {
        if self.transition.is_some() {
            self.queued = Some(mode);
        } else {
            self.pending = Some(mode);
        }
    }

    /// Drain the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<RigEvent> {
        std::mem::take(&mut self.events)
    }

    /// Mode selection, free flight and pitch look. Ignored while transitioning.
    pub fn poll_input(&mut self, input: &InputState, dt: f32) {
        if self.transition.is_some() {
            return;
        }

        if input.is_held(InputAction::FirstPersonView) {
            self.pending = Some(CameraMode::FirstPerson);
        } else if input.is_held(InputAction::ThirdPersonView) {
            self.pending = Some(CameraMode::ThirdPerson);
        } else if input.is_held(InputAction::GodView) {
            self.pending = Some(CameraMode::God);
        }

        let delta = input.movement_axes() * self.config.move_speed * dt;
        if delta != Vec3::ZERO {
            self.pose.position += delta;
            if self.tracked.is_some() {
                self.offset += delta;
            }
        }

        let look = input.look_axes();
        if look.y != 0.0 {
            let pitch = self.pose.orientation.x - self.config.pitch_speed * look.y;
            self.pose.orientation.x = pitch.clamp(self.config.pitch_min, self.config.pitch_max);
        }
    }

    /// Start, advance or finish a transition; follow the tracked body while idle.
    ///
    /// `tracked_position` is the tracked body's current position, if any.
    pub fn step_transition(&mut self, dt: f32, tracked_position: Option<Vec3>) {
        if self.transition.is_none() {
            if let Some(requested) = self.pending {
                self.begin_transition(requested, tracked_position);
            }
            if self.transition.is_none() {
                self.follow(tracked_position);
            }
            return;
        }

        self.advance(dt, tracked_position);
    }

    fn begin_transition(&mut self, requested: CameraMode, tracked_position: Option<Vec3>) {
        let target = self.anchor(requested).resolve(tracked_position);
        let move_distance = self.pose.position.distance(target.position);
        let camera_available =
            self.camera(self.mode).is_some() || self.camera(requested).is_none();

        if move_distance <= self.config.anchor_epsilon || !camera_available {
            debug!(
                "Discarding {:?} request (distance {:.3}, camera available: {})",
                requested, move_distance, camera_available
            );
            self.pending = None;
            self.events.push(RigEvent::RequestDiscarded { requested });
            return;
        }

        let rotate_angle = self.pose.angle_to(&target);
        debug!(
            "Transition {:?} -> {:?}: {:.2} units, {:.1} degrees",
            self.mode, requested, move_distance, rotate_angle
        );

        self.events.push(RigEvent::TransitionStarted {
            from: self.mode,
            to: requested,
        });
        self.transition = Some(Transition {
            to: requested,
            start: self.pose,
            target,
            move_distance,
            rotate_angle,
            travel_fraction: 0.0,
            rotate_fraction: 0.0,
        });
    }

    fn advance(&mut self, dt: f32, tracked_position: Option<Vec3>) {
        let Some(mut transition) = self.transition else {
            return;
        };

        if transition.move_distance <= f32::EPSILON && transition.travel_fraction < 1.0 {
            debug!("Degenerate transition to {:?}", transition.to);
            self.events
                .push(RigEvent::DegenerateTransition { to: transition.to });
        }

        transition.travel_fraction = advance_fraction(
            transition.travel_fraction,
            transition.move_distance,
            self.config.fly_speed,
            dt,
        );
        transition.rotate_fraction = advance_fraction(
            transition.rotate_fraction,
            transition.rotate_angle,
            self.config.rotate_speed,
            dt,
        );

        self.pose = Pose::lerp(
            &transition.start,
            &transition.target,
            ease(transition.travel_fraction, self.config.ease_factor),
            ease(transition.rotate_fraction, self.config.ease_factor),
        );

        if transition.is_complete() {
            self.finish(transition, tracked_position);
        } else {
            self.transition = Some(transition);
        }
    }

    fn finish(&mut self, transition: Transition, tracked_position: Option<Vec3>) {
        self.transition = None;
        self.pose = transition.target;
        self.mode = transition.to;
        self.pending = self.queued.take();
        self.settled_orientation = transition.target.orientation;

        if let Some(body_position) = tracked_position {
            let anchor = self.anchor(transition.to);
            self.offset = match anchor.space {
                AnchorSpace::Tracked => anchor.position,
                AnchorSpace::World => self.pose.position - body_position,
            };
        }

        debug!("Camera settled in {:?}", self.mode);
        self.events
            .push(RigEvent::TransitionFinished { mode: self.mode });
    }

    fn follow(&mut self, tracked_position: Option<Vec3>) {
        let (Some(_), Some(body_position)) = (self.tracked, tracked_position) else {
            return;
        };

        let snap = match self.config.tracking {
            TrackingPolicy::AlwaysSnap => true,
            TrackingPolicy::DriftBand => {
                self.pose.position.distance(body_position)
                    <= self.offset.length() + self.config.drift_margin
            }
        };
        if snap {
            self.pose.position = body_position + self.offset;
        }
    }

    /// Cut the rendered camera over to the pending mode's dedicated camera.
    ///
    /// This is instant; the pose keeps easing inside the new camera object.
    pub fn switch_camera(&mut self, render: &mut dyn RenderService) {
        // Only requests that passed the start guard
        if self.transition.is_none() {
            return;
        }
        let Some(requested) = self.pending else {
            return;
        };
        if requested == self.mode {
            return;
        }
        let Some(next) = self.camera(requested) else {
            return;
        };

        let previous = self.active_camera;
        if previous != next {
            render.set_camera_enabled(previous, false);
        }
        render.set_camera_enabled(next, true);

        self.active_camera = next;
        self.mode = requested;
        self.events.push(RigEvent::CameraSwitched {
            from: previous,
            to: next,
        });
    }

    /// Push the current pose to the active camera object
    pub fn sync_render(&self, render: &mut dyn RenderService) {
        render.set_camera_pose(self.active_camera, self.pose);
    }

    /// Picking ray through a cursor position in normalized device coordinates
    pub fn cursor_ray(&self, cursor: Vec2) -> Option<Ray> {
        let half_height = (self.config.fov_degrees.to_radians() * 0.5).tan();
        let local = Vec3::new(
            cursor.x * half_height * self.config.aspect_ratio,
            cursor.y * half_height,
            -1.0,
        );
        Ray::new(self.pose.position, self.pose.rotation() * local)
    }
}
