//! Possession module
//!
//! Transfers player control between physical bodies: raycast picking,
//! line-of-sight validation, activation cooldowns, and the reset and bounds
//! watchdogs that run every frame.

mod body;
mod config;
mod controller;
mod error;

pub use body::{Activation, BodyTag, BodyViews, BoundsPolicy, PossessableBody};
pub use config::PossessionConfig;
pub use controller::PossessionController;
pub use error::PossessError;
