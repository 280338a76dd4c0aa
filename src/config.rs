//! Configuration persistence for editor settings

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Color;
use crate::error::ConfigError;
use crate::fields::{FieldCache, FieldType, FieldValue};

/// Editor configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo steps per surface (0 = unlimited)
    pub undo_limit: usize,
    /// Whether new elements start from the last values the user picked
    pub remember_field_values: bool,
    /// First number handed out to step labels
    pub counter_start: i32,
    /// Outline color for new shapes
    #[serde(default = "default_line_color")]
    pub line_color: Color,
    /// Outline thickness in pixels
    #[serde(default = "default_line_thickness")]
    pub line_thickness: i32,
    /// Fill color for new shapes
    #[serde(default = "default_fill_color")]
    pub fill_color: Color,
    /// Whether to draw a drop shadow under shapes
    #[serde(default = "default_shadow")]
    pub shadow: bool,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Pixelation block size
    #[serde(default = "default_pixel_size")]
    pub pixel_size: i32,
}

fn default_line_color() -> Color {
    Color::RED
}

fn default_line_thickness() -> i32 {
    2
}

fn default_fill_color() -> Color {
    Color::TRANSPARENT
}

fn default_shadow() -> bool {
    true
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_pixel_size() -> i32 {
    5
}

impl EditorConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "snappea-editor";

    /// Default location of the config file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match Self::path() {
            Some(path) => {
                if let Err(err) = self.save_to(&path) {
                    log::error!("Failed to save config: {:?}", err);
                }
            }
            None => log::error!("Could not determine config directory for saving"),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let dir = path.parent().ok_or(ConfigError::NoConfigDir)?;
        fs::create_dir_all(dir)?;
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Undo depth for new surfaces
    pub fn undo_limit(&self) -> Option<usize> {
        (self.undo_limit > 0).then_some(self.undo_limit)
    }

    /// Configured values that replace the static field defaults
    pub fn field_overrides(&self) -> HashMap<FieldType, FieldValue> {
        HashMap::from([
            (FieldType::LineColor, FieldValue::Color(self.line_color)),
            (FieldType::LineThickness, FieldValue::Int(self.line_thickness)),
            (FieldType::FillColor, FieldValue::Color(self.fill_color)),
            (FieldType::Shadow, FieldValue::Bool(self.shadow)),
            (FieldType::FontFamily, FieldValue::String(self.font_family.clone())),
            (FieldType::PixelSize, FieldValue::Int(self.pixel_size)),
        ])
    }

    /// Session field cache seeded from this configuration
    pub fn field_cache(&self) -> FieldCache {
        FieldCache::new(self.field_overrides(), self.remember_field_values)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: 0,
            remember_field_values: true,
            counter_start: 1,
            line_color: default_line_color(),
            line_thickness: default_line_thickness(),
            fill_color: default_fill_color(),
            shadow: default_shadow(),
            font_family: default_font_family(),
            pixel_size: default_pixel_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Scope;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = EditorConfig {
            undo_limit: 20,
            line_color: Color::BLACK,
            pixel_size: 12,
            ..EditorConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(EditorConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"counter_start": 5}"#).unwrap();
        assert_eq!(config.counter_start, 5);
        assert_eq!(config.line_color, Color::RED);
        assert!(config.remember_field_values);
        assert_eq!(config.undo_limit(), None);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            EditorConfig::load_from(&path),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_overrides_seed_field_cache() {
        let config = EditorConfig {
            line_thickness: 7,
            ..EditorConfig::default()
        };
        let cache = config.field_cache();
        let value = cache.initial_value(FieldType::LineThickness, Scope("RectangleContainer"), None);
        assert_eq!(value, FieldValue::Int(7));
    }
}
