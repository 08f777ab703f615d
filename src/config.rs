//! Configuration file support.
//!
//! Preferences and drawing styles are stored as versioned JSON, by default
//! under the platform config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::format::LoadPolicy;
use crate::geometry::DEFAULT_OVAL_STEPS;
use crate::view::{DEFAULT_MAX_SCALE, DEFAULT_MIN_DIMENSION, DEFAULT_ZOOM_STEP};

/// Log level setting for the annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Annotator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Interaction preferences
    #[serde(default)]
    pub preferences: Preferences,

    /// Outline colours per selection role
    #[serde(default)]
    pub styles: StyleConfig,
}

/// Preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Multiplicative zoom step; one wheel direction applies it, the other
    /// its inverse
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,

    /// Upper bound of the effective view scale
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,

    /// Samples per oval when it takes part in combine or cut
    #[serde(default = "default_oval_steps")]
    pub oval_steps: usize,

    /// Pyramid halving stops below this dimension
    #[serde(default = "default_pyramid_min_dimension")]
    pub pyramid_min_dimension: u32,

    /// Treatment of unknown shape kinds when loading
    #[serde(default)]
    pub shape_policy: LoadPolicy,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_zoom_step() -> f64 {
    DEFAULT_ZOOM_STEP
}

fn default_max_scale() -> f64 {
    DEFAULT_MAX_SCALE
}

fn default_oval_steps() -> usize {
    DEFAULT_OVAL_STEPS
}

fn default_pyramid_min_dimension() -> u32 {
    DEFAULT_MIN_DIMENSION
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            zoom_step: default_zoom_step(),
            max_scale: default_max_scale(),
            oval_steps: default_oval_steps(),
            pyramid_min_dimension: default_pyramid_min_dimension(),
            shape_policy: LoadPolicy::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Drawing styles section of the config. Colours are RGB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub normal: [u8; 3],
    pub move_target: [u8; 3],
    pub delete: [u8; 3],
    pub combine: [u8; 3],
    /// Shape being drawn
    pub preview: [u8; 3],
    pub cut_line: [u8; 3],
    pub line_width: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            normal: [0, 128, 0],
            move_target: [0, 0, 255],
            delete: [255, 0, 0],
            combine: [255, 165, 0],
            preview: [0, 200, 0],
            cut_line: [255, 0, 255],
            line_width: 2.0,
        }
    }
}

impl AnnotatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: Preferences::default(),
            styles: StyleConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "region-annotator.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(
                config_dir
                    .join("region-annotator")
                    .join(Self::default_filename()),
            )
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("region-annotator")
                    .join(Self::default_filename())
            })
        }
    }

    /// Read configuration from `path`.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
