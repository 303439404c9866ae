//! Engine configuration.
//!
//! Hosts can ship a JSON file to tune hit tolerance, canvas limits, colors
//! and log verbosity. Every field has a default, so `{"version": 1}` (or
//! `{}`) is a complete configuration.

use serde::{Deserialize, Serialize};

use crate::hit_test::DEFAULT_LINE_TOLERANCE;
use crate::model::Extent;
use crate::render::RenderStyle;

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Largest canvas the image is ever shown in, whatever space the layout
/// offers.
pub const DEFAULT_MAX_CANVAS: Extent = Extent {
    width: 800.0,
    height: 600.0,
};

/// Log level setting for the engine.
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
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

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

    /// Convert to a log crate Level, for backends that take one.
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Tunable engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Distance in screen pixels within which a click selects a line
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,

    /// Upper bound for the canvas size
    #[serde(default = "default_max_canvas")]
    pub max_canvas: Extent,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Colors and stroke widths
    #[serde(default)]
    pub style: RenderStyle,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_hit_tolerance() -> f64 {
    DEFAULT_LINE_TOLERANCE
}

fn default_max_canvas() -> Extent {
    DEFAULT_MAX_CANVAS
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            hit_tolerance: default_hit_tolerance(),
            max_canvas: default_max_canvas(),
            log_level: LogLevel::default(),
            style: RenderStyle::default(),
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

        if !(config.hit_tolerance.is_finite() && config.hit_tolerance >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "hit_tolerance",
                message: format!("must be a non-negative number, got {}", config.hit_tolerance),
            });
        }

        Ok(config)
    }

    /// Apply the configured log level to the global `log` filter.
    pub fn apply_log_level(&self) {
        log::set_max_level(self.log_level.to_level_filter());
    }
}

impl Default for EngineConfig {
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

    /// A field holds a value the engine cannot use
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}
