//! Configuration - strip tunables and TOML persistence
//!
//! Provides [`StripConfig`] plus functions for loading and saving any
//! serializable configuration under the per-user config directory.

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::mapper::DEFAULT_SNAP_STEP;
use crate::pan::PanTimeouts;
use crate::placement::{Activity, ActivityId};
use crate::zoom::ZoomLevel;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Stand-in used when a dropped item is missing from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderActivity {
    pub title: String,
    pub icon: String,
    pub duration_minutes: u32,
    pub points: u32,
}

impl PlaceholderActivity {
    pub fn activity_for(&self, id: &ActivityId) -> Activity {
        Activity {
            id: id.clone(),
            title: self.title.clone(),
            icon: self.icon.clone(),
            duration_minutes: self.duration_minutes,
            points: self.points,
        }
    }
}

impl Default for PlaceholderActivity {
    fn default() -> Self {
        Self {
            title: "Activity".to_string(),
            icon: "⭐".to_string(),
            duration_minutes: 30,
            points: 1,
        }
    }
}

/// Tunables for one timeline strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    pub default_zoom: ZoomLevel,
    pub snap_step_minutes: u32,
    /// Interval that advances "now" and recenters the strip
    pub coarse_tick_secs: u64,
    /// Interval of the live time readout
    pub fine_tick_secs: u64,
    pub pan_watchdog_ms: u64,
    pub pan_idle_timeout_ms: u64,
    pub hover_timeout_ms: u64,
    pub fade_ms: u64,
    /// Drop target id of the strip itself
    pub strip_target_id: String,
    /// Drop target id that unschedules placed items
    pub remove_target_id: String,
    /// Freeze the focus on the scheduled time after a successful drop
    pub recenter_on_drop: bool,
    pub placeholder: PlaceholderActivity,
}

impl StripConfig {
    pub fn coarse_tick(&self) -> Duration {
        Duration::from_secs(self.coarse_tick_secs.max(1))
    }

    pub fn fine_tick(&self) -> Duration {
        Duration::from_secs(self.fine_tick_secs.max(1))
    }

    pub fn pan_timeouts(&self) -> PanTimeouts {
        PanTimeouts {
            max_gesture: Duration::from_millis(self.pan_watchdog_ms),
            pointer_idle: Duration::from_millis(self.pan_idle_timeout_ms),
        }
    }

    pub fn hover_timeout(&self) -> Duration {
        Duration::from_millis(self.hover_timeout_ms)
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            default_zoom: ZoomLevel::default(),
            snap_step_minutes: DEFAULT_SNAP_STEP,
            coarse_tick_secs: 60,
            fine_tick_secs: 1,
            pan_watchdog_ms: 8_000,
            pan_idle_timeout_ms: 3_000,
            hover_timeout_ms: 4_000,
            fade_ms: 1_000,
            strip_target_id: "timeline".to_string(),
            remove_target_id: "inventory".to_string(),
            recenter_on_drop: true,
            placeholder: PlaceholderActivity::default(),
        }
    }
}

/// Get the base configuration directory for all planners
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "habit-planner", "planner")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the configuration file path for a named app
pub fn config_path(name: &str) -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(format!("{}.toml", name)))
}

/// Load configuration for a named app
///
/// Returns `None` if the config file doesn't exist yet.
/// Returns an error if the file exists but can't be parsed.
pub fn load_config<T: DeserializeOwned>(name: &str) -> Result<Option<T>, ConfigError> {
    let path = config_path(name).ok_or(ConfigError::NoConfigDir)?;
    load_config_from(&path)
}

/// Load configuration from an explicit path
pub fn load_config_from<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let config: T = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Save configuration for a named app
pub fn save_config<T: Serialize>(name: &str, config: &T) -> Result<(), ConfigError> {
    let path = config_path(name).ok_or(ConfigError::NoConfigDir)?;
    save_config_to(&path, config)
}

/// Save configuration to an explicit path, creating parent directories
pub fn save_config_to<T: Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Delete configuration for a named app
pub fn delete_config(name: &str) -> Result<(), ConfigError> {
    let path = config_path(name).ok_or(ConfigError::NoConfigDir)?;

    if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        if let Some(path) = config_path("day_planner") {
            assert!(path.to_string_lossy().ends_with("day_planner.toml"));
        }
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("strip.toml");

        let mut config = StripConfig::default();
        config.default_zoom = ZoomLevel::new(7);
        config.snap_step_minutes = 15;
        config.placeholder.title = "Something".to_string();

        save_config_to(&path, &config).unwrap();
        let loaded: Option<StripConfig> = load_config_from(&path).unwrap();
        assert_eq!(loaded, Some(config));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<StripConfig> = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strip.toml");
        fs::write(&path, "default_zoom = 12\nfade_ms = 250\n").unwrap();

        let loaded: StripConfig = load_config_from(&path).unwrap().unwrap();
        assert_eq!(loaded.default_zoom, ZoomLevel::MAX);
        assert_eq!(loaded.fade_ms, 250);
        assert_eq!(loaded.snap_step_minutes, DEFAULT_SNAP_STEP);
        assert_eq!(loaded.strip_target_id, "timeline");
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strip.toml");
        fs::write(&path, "default_zoom = [").unwrap();

        let result: Result<Option<StripConfig>, ConfigError> = load_config_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
