//! Possession configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::BoundsPolicy;

/// Possession configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionConfig {
    /// Maximum line-of-sight distance between the possessed body and a target
    pub possess_distance: f32,
    /// Seconds of cooldown after a possession, and of grace before an abandoned body resets
    pub reset_timer: f32,
    /// Impulse magnitude applied along a body's forward axis when it activates
    pub activation_impulse: f32,
    /// Position (units) and orientation (degrees) tolerance when comparing against a reset pose
    pub pose_tolerance: f32,
    /// Play volume for bodies without their own bounds
    pub bounds: BoundsPolicy,
    /// Goal spin rate in degrees per second
    pub goal_spin_speed: f32,
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self {
            possess_distance: 20.0,
            reset_timer: 2.0,
            activation_impulse: 5.0,
            pose_tolerance: 0.01,
            bounds: BoundsPolicy::default(),
            goal_spin_speed: 10.0,
        }
    }
}

impl PossessionConfig {
    /// Check that every value is usable by the controller
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.possess_distance <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "possession.possess_distance",
                value: self.possess_distance,
            });
        }
        if self.reset_timer < 0.0 {
            return Err(ConfigError::Negative {
                field: "possession.reset_timer",
                value: self.reset_timer,
            });
        }
        if self.activation_impulse < 0.0 {
            return Err(ConfigError::Negative {
                field: "possession.activation_impulse",
                value: self.activation_impulse,
            });
        }
        if self.pose_tolerance < 0.0 {
            return Err(ConfigError::Negative {
                field: "possession.pose_tolerance",
                value: self.pose_tolerance,
            });
        }
        self.bounds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PossessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_distance() {
        let config = PossessionConfig {
            possess_distance: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { .. })));
    }
}
