//! Top-level simulation configuration

use possession_core::TimeConfig;
use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::error::ConfigError;
use crate::possession::PossessionConfig;

/// Everything the simulation can be tuned with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub time: TimeConfig,
    pub camera: CameraConfig,
    pub possession: PossessionConfig,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time.time_scale < 0.0 {
            return Err(ConfigError::Negative {
                field: "time.time_scale",
                value: self.time.time_scale,
            });
        }
        if self.time.max_delta_time <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "time.max_delta_time",
                value: self.time.max_delta_time,
            });
        }
        self.camera.validate()?;
        self.possession.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_sections_parse_from_toml() {
        let text = r#"
            [camera]
            ease_factor = 2.0

            [possession]
            possess_distance = 35.0

            [possession.bounds]
            floor_y = -4.0
            min_x = -20.0
            max_x = 20.0
            min_z = -20.0
            max_z = 20.0
        "#;
        let config: SimulationConfig = toml::from_str(text).unwrap();
        assert_eq!(config.camera.ease_factor, 2.0);
        assert_eq!(config.possession.possess_distance, 35.0);
        assert_eq!(config.possession.bounds.floor_y, -4.0);
        assert_eq!(config.possession.reset_timer, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_errors_surface() {
        let mut config = SimulationConfig::default();
        config.possession.bounds.min_x = 150.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedRange {
                field: "bounds.min_x/max_x"
            })
        );
    }
}
