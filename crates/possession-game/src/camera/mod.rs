//! Camera system module
//!
//! Provides the three-view camera rig (first-person, third-person, God) with
//! eased transitions between per-mode view anchors.

mod config;
mod easing;
mod rig;

pub use config::{AnchorSpace, CameraConfig, TrackingPolicy, ViewAnchor};
pub use easing::ease;
pub use rig::{CameraMode, CameraRig, RigEvent};
