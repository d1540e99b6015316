//! Configuration and scene setup errors

use possession_core::BodyId;

/// A configuration value the simulation cannot work with
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field}: minimum exceeds maximum")]
    InvertedRange { field: &'static str },
}

/// Errors that can occur while assembling a simulation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("scene has no possessable bodies")]
    NoBodies,

    #[error("no body is marked as initially possessed and none sits at the camera start")]
    NoInitialBody,

    #[error("initial body {0} is not part of the scene")]
    UnknownInitialBody(BodyId),

    #[error("duplicate body id {0}")]
    DuplicateBody(BodyId),

    #[error("physics service has no pose for {0}")]
    MissingPhysicsBody(BodyId),
}
