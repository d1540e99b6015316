//! Host settings with persistence
//!
//! Settings are saved to `~/.config/possession/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use possession_game::SimulationConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All host settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub video: VideoSettings,
    pub controls: ControlSettings,
    pub session: SessionSettings,
    pub simulation: SimulationConfig,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("possession"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk. Defaults are used, and written out, when no file exists.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            let settings = Self::default();
            if let Err(e) = settings.save_to(&path) {
                warn!("Failed to write default settings: {}", e);
            }
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse and validate settings text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.simulation.validate()?;
        Ok(settings)
    }

    /// Save settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Simulation config with the camera's picking frustum taken from the video settings
    pub fn simulation_config(&self) -> SimulationConfig {
        let mut config = self.simulation.clone();
        config.camera.fov_degrees = self.video.fov;
        config.camera.aspect_ratio = self.video.aspect_ratio();
        config
    }
}

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Viewport width
    pub width: u32,
    /// Viewport height
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fov: 60.0,
        }
    }
}

impl VideoSettings {
    /// Get the resolution as a tuple
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Mouse settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Mouse look multiplier
    pub mouse_sensitivity: f32,
    /// Invert vertical look
    pub invert_y: bool,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.1,
            invert_y: false,
        }
    }
}

/// Headless session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Level layout file; the bundled courtyard is used when unset
    pub level: Option<PathBuf>,
    /// Simulated frames per second
    pub frame_rate: u32,
    /// Session length in simulated seconds
    pub duration_seconds: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            level: None,
            frame_rate: 60,
            duration_seconds: 20.0,
        }
    }
}

impl SessionSettings {
    /// Seconds per frame
    pub fn frame_time(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }

    /// Number of frames the session runs for
    pub fn frame_count(&self) -> u64 {
        (self.duration_seconds.max(0.0) * self.frame_rate.max(1) as f32).ceil() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        let parsed = Settings::parse(&text).unwrap();
        assert_eq!(parsed.video.resolution(), (1280, 720));
        assert_eq!(parsed.session.frame_rate, 60);
    }

    #[test]
    fn test_partial_file() {
        let settings = Settings::parse("[video]\nfov = 75.0\n\n[simulation.camera]\nfly_speed = 3.0").unwrap();
        assert_eq!(settings.video.fov, 75.0);
        assert_eq!(settings.video.width, 1280);
        assert_eq!(settings.simulation.camera.fly_speed, 3.0);

        let config = settings.simulation_config();
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert!((config.camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_saved_settings_load_back() {
        let path = std::env::temp_dir()
            .join(format!("possession-settings-{}", std::process::id()))
            .join("settings.toml");
        let mut settings = Settings::default();
        settings.controls.mouse_sensitivity = 0.25;
        settings.controls.invert_y = true;
        settings.session.frame_rate = 30;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.controls.mouse_sensitivity, 0.25);
        assert!(loaded.controls.invert_y);
        assert_eq!(loaded.session.frame_rate, 30);

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_unreadable_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("possession-settings-missing").join("nope.toml");
        let settings = Settings::load_from(&path);
        assert_eq!(settings.session.frame_rate, 60);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Settings::parse("[simulation.camera]\nease_factor = 7.0").is_err());
    }

    #[test]
    fn test_session_frames() {
        let session = SessionSettings {
            level: None,
            frame_rate: 30,
            duration_seconds: 2.0,
        };
        assert_eq!(session.frame_count(), 60);
        assert!((session.frame_time() - 1.0 / 30.0).abs() < 1e-7);
    }
}
