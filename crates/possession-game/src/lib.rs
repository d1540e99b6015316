//! Possession Game - camera rig and possession protocol
//!
//! Provides the three-view camera rig, the body-possession controller with its
//! watchdogs, input mapping, and the per-frame scheduler that ticks them.

pub mod camera;
pub mod config;
pub mod error;
pub mod goal;
pub mod input;
pub mod possession;
pub mod services;
pub mod simulation;

#[cfg(test)]
mod test_support;

pub use camera::{CameraConfig, CameraMode, CameraRig, RigEvent, TrackingPolicy, ViewAnchor};
pub use config::SimulationConfig;
pub use error::{ConfigError, SetupError};
pub use goal::GoalSpinner;
pub use input::{InputAction, InputBindings, InputHandler, InputState};
pub use possession::{
    BodyTag, BodyViews, BoundsPolicy, PossessError, PossessableBody, PossessionConfig,
    PossessionController,
};
pub use services::{Outcome, Presentation, RenderService};
pub use simulation::{FrameReport, SceneSetup, Simulation};
