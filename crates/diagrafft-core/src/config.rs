//! Editor configuration.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How a marquee rectangle decides which entities it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionMode {
    /// Entity bounds must lie fully inside the rectangle.
    #[default]
    Inclusive,
    /// Any overlap with the rectangle is enough.
    Touching,
}

/// Tunables for hit-testing, gestures and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Extra distance (world units) accepted around thin entities such as connections.
    pub hit_tolerance: f64,
    /// Side length of a tracker grip.
    pub grip_size: f64,
    /// Radius within which a dragged connector snaps onto another one.
    pub connector_snap_radius: f64,
    /// Marquee containment rule.
    pub inclusion_mode: InclusionMode,
    /// Maximum number of undo steps kept.
    pub max_undo_history: usize,
    /// Offset applied to pasted entities.
    pub paste_offset: Vec2,
    /// Distance moved by one arrow key press.
    pub nudge_step: f64,
    /// Drawn shapes smaller than this on both axes are discarded.
    pub min_shape_size: f64,
    /// Smallest extent a transform may shrink the tracker to.
    pub min_extent: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: 4.0,
            grip_size: 8.0,
            connector_snap_radius: 6.0,
            inclusion_mode: InclusionMode::Inclusive,
            max_undo_history: 100,
            paste_offset: Vec2::new(10.0, 10.0),
            nudge_step: 1.0,
            min_shape_size: 2.0,
            min_extent: 1.0,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{ "nudge_step": 5.0 }"#).unwrap();
        assert!((config.nudge_step - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.max_undo_history, 100);
        assert_eq!(config.inclusion_mode, InclusionMode::Inclusive);
    }

    #[test]
    fn test_inclusion_mode_names() {
        let config = EditorConfig::from_json(r#"{ "inclusion_mode": "touching" }"#).unwrap();
        assert_eq!(config.inclusion_mode, InclusionMode::Touching);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");

        let config = EditorConfig {
            grip_size: 12.0,
            ..EditorConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EditorConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
