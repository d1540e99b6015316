//! Possession - headless session host
//!
//! Loads settings and a level, then drives the simulation with a short
//! scripted input sequence, logging what the rig and the possession
//! controller do.

mod level;
mod settings;

use std::fs;

use anyhow::{Context, Result};
use possession_core::{CameraId, Pose, Ray};
use possession_game::{
    InputHandler, Outcome, Presentation, RenderService, SceneSetup, Simulation,
};
use possession_physics::{PhysicsConfig, PhysicsService, PhysicsWorld};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

use level::LevelLayout;
use settings::Settings;

/// Renderer stand-in that logs camera changes
#[derive(Debug, Default)]
struct LogRender {
    active: Option<CameraId>,
    last_pose: Pose,
}

impl RenderService for LogRender {
    fn set_camera_enabled(&mut self, camera: CameraId, enabled: bool) {
        debug!("{} enabled: {}", camera, enabled);
        if enabled {
            self.active = Some(camera);
        }
    }

    fn set_camera_pose(&mut self, _camera: CameraId, pose: Pose) {
        self.last_pose = pose;
    }
}

/// Pause/menu stand-in that logs round outcomes
#[derive(Debug, Default)]
struct LogPresentation;

impl Presentation for LogPresentation {
    fn report_win(&mut self, level_id: u32) {
        info!("*** Level {} complete ***", level_id);
    }

    fn report_death(&mut self) {
        warn!("*** The possessed body was lost ***");
    }
}

/// One scripted input
#[derive(Debug, Clone, Copy)]
enum Cue {
    /// Tap a key
    Key(KeyCode),
    /// Click on the named body
    Possess(&'static str),
    /// Drag the captured mouse vertically by this many pixels
    Look(f64),
}

/// The demo input sequence, by simulated time
const SCRIPT: &[(f32, Cue)] = &[
    (0.5, Cue::Key(KeyCode::Digit2)),
    (2.5, Cue::Possess("cart")),
    (3.0, Cue::Possess("barrel")),
    (5.0, Cue::Look(-60.0)),
    (7.0, Cue::Key(KeyCode::Digit3)),
    (10.0, Cue::Possess("idol")),
];

/// Feeds [`SCRIPT`] into an input handler as key and mouse events
struct ScriptedInput {
    next: usize,
    release: Vec<Cue>,
}

impl ScriptedInput {
    fn new() -> Self {
        Self {
            next: 0,
            release: Vec::new(),
        }
    }

    fn apply(
        &mut self,
        time: f32,
        handler: &mut InputHandler,
        sim: &Simulation,
        layout: &LevelLayout,
        physics: &PhysicsWorld,
    ) {
        for cue in self.release.drain(..) {
            press(handler, cue, ElementState::Released);
        }

        while let Some(&(at, cue)) = SCRIPT.get(self.next) {
            if at > time {
                break;
            }
            self.next += 1;

            if let Cue::Possess(name) = cue {
                let target = layout.body_id(name).and_then(|id| physics.pose(id));
                let Some(target) = target else {
                    warn!("Script names unknown body '{}'", name);
                    continue;
                };
                let eye = sim.rig().position();
                handler.state.pick_ray = Ray::new(eye, target.position - eye);
                info!("Clicking on {}", name);
            }
            press(handler, cue, ElementState::Pressed);
            self.release.push(cue);
        }
    }
}

fn press(handler: &mut InputHandler, cue: Cue, state: ElementState) {
    match cue {
        Cue::Key(key) => handler.handle_keyboard(PhysicalKey::Code(key), state),
        Cue::Possess(_) => handler.handle_mouse_button(MouseButton::Left, state),
        Cue::Look(dy) => {
            let pressed = state == ElementState::Pressed;
            handler.set_cursor_captured(pressed);
            if pressed {
                handler.handle_mouse_motion((0.0, dy));
            }
        }
    }
}

fn load_level(settings: &Settings) -> Result<LevelLayout> {
    match &settings.session.level {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read level {:?}", path))?;
            LevelLayout::from_json(&text).context("Failed to parse level")
        }
        None => LevelLayout::bundled().context("Failed to parse bundled level"),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting possession session...");

    let settings = Settings::load();
    let layout = load_level(&settings)?;
    let dt = settings.session.frame_time();

    let mut physics = PhysicsWorld::with_config(PhysicsConfig {
        timestep: dt,
        ..Default::default()
    });
    let setup: SceneSetup = layout.build(&mut physics).context("Failed to build level")?;

    let mut render = LogRender::default();
    let mut presentation = LogPresentation;
    let mut sim = Simulation::new(settings.simulation_config(), setup, &physics, &mut render)
        .context("Failed to start simulation")?;

    let mut input = InputHandler::new();
    input.mouse_sensitivity = settings.controls.mouse_sensitivity;
    input.invert_y = settings.controls.invert_y;
    let (width, height) = settings.video.resolution();
    input.handle_cursor_moved((width as f64 * 0.5, height as f64 * 0.5), (width, height));

    let mut script = ScriptedInput::new();
    for frame in 0..settings.session.frame_count() {
        script.apply(frame as f32 * dt, &mut input, &sim, &layout, &physics);

        let report = sim.tick(dt, &input.state, &mut physics, &mut render, &mut presentation);
        physics.step();
        input.end_frame();

        for event in &report.rig_events {
            debug!("Frame {}: {:?}", report.frame, event);
        }
        match report.possession {
            Some(Ok(body)) => info!("Frame {}: now possessing {}", report.frame, body),
            Some(Err(err)) => info!("Frame {}: possession rejected: {}", report.frame, err),
            None => {}
        }

        if let Some(outcome) = sim.outcome() {
            match outcome {
                Outcome::Win { level_id } => info!("Won level {} at {:.2}s", level_id, sim.time().total_time),
                Outcome::Death { body } => info!("{} died at {:.2}s", body, sim.time().total_time),
            }
            break;
        }
    }

    info!(
        "Session over: camera in {:?} at {:?} through {:?}, possessing {}",
        sim.rig().mode(),
        render.last_pose.position,
        render.active.unwrap_or(sim.rig().active_camera()),
        sim.possession().possessed()
    );
    Ok(())
}
