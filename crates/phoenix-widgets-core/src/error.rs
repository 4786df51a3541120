//! Core error types for phoenix-widgets-core.
//!
//! The engagement, relevance and lifecycle operations are total and never
//! fail. Errors only come from configuration I/O, constraint validation and
//! the capacity-aware placement entry point.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for phoenix-widgets-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Placement errors
    #[error("Placement error: {0}")]
    Placement(#[from] PlacementError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML write errors
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Home directory could not be resolved
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Inverted min/max range
    #[error("Invalid range for '{field}': min ({min}) must not exceed max ({max})")]
    InvalidRange { field: String, min: f64, max: f64 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Placement errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// The host already shows the maximum number of widgets
    #[error("Widget limit reached ({max_widgets} active widgets)")]
    AtCapacity { max_widgets: usize },

    /// No free grid cell fits the widget
    #[error("No free position for a {width}x{height} widget")]
    NoSpace { width: f64, height: f64 },
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
