//! Rendering and presentation collaborators
//!
//! The core never draws anything or shows menus. It tells a [`RenderService`]
//! which camera object is live and where it sits, and reports round-ending
//! outcomes to a [`Presentation`] layer.

use possession_core::{BodyId, CameraId, Pose};
use serde::{Deserialize, Serialize};

/// Camera objects as seen by the renderer
pub trait RenderService {
    /// Enable or disable a camera object
    fn set_camera_enabled(&mut self, camera: CameraId, enabled: bool);

    /// Place the active camera
    fn set_camera_pose(&mut self, camera: CameraId, pose: Pose);
}

/// Terminal signals for the current round
pub trait Presentation {
    /// The player possessed the level's goal
    fn report_win(&mut self, level_id: u32);

    /// The possessed body left the play volume
    fn report_death(&mut self);
}

/// Round-ending outcome, also returned in the per-frame report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win { level_id: u32 },
    Death { body: BodyId },
}

impl Outcome {
    /// Forward this outcome to the presentation layer
    pub fn report(&self, presentation: &mut dyn Presentation) {
        match *self {
            Outcome::Win { level_id } => presentation.report_win(level_id),
            Outcome::Death { .. } => presentation.report_death(),
        }
    }
}
