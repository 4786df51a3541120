//! TOML-based engine configuration.
//!
//! Stores tunables for:
//! - Layout constraints (margins, widget size limits, spacing)
//! - Relevance weights and decay constants
//! - Lifecycle thresholds
//! - Driver periods and the tick quantum
//! - Placement grid and default viewport
//!
//! Configuration is stored at `~/.config/phoenix-widgets/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::drivers::DriverIntervals;
use crate::engagement::DEFAULT_TICK_QUANTUM_MS;
use crate::error::{ConfigError, CoreError, Result};
use crate::geometry::Viewport;
use crate::lifecycle::LifecycleThresholds;
use crate::placement::{Constraints, DEFAULT_GRID_STEP};
use crate::relevance::RelevanceWeights;
use crate::service::EngineSettings;

/// Placement configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    #[serde(default = "default_grid_step")]
    pub grid_step: f64,
    /// Viewport assumed by commands that have no live screen.
    #[serde(default)]
    pub viewport: Viewport,
}

/// Engagement tracking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_tick_quantum_ms")]
    pub tick_quantum_ms: u64,
}

fn default_grid_step() -> f64 {
    DEFAULT_GRID_STEP
}
fn default_tick_quantum_ms() -> u64 {
    DEFAULT_TICK_QUANTUM_MS
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            grid_step: default_grid_step(),
            viewport: Viewport::default(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick_quantum_ms: default_tick_quantum_ms(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/phoenix-widgets/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub relevance: RelevanceWeights,
    #[serde(default)]
    pub lifecycle: LifecycleThresholds,
    #[serde(default)]
    pub drivers: DriverIntervals,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Returns `~/.config/phoenix-widgets[-dev]/` based on PHOENIX_WIDGETS_ENV.
///
/// `PHOENIX_WIDGETS_CONFIG_DIR` overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn config_dir() -> Result<PathBuf> {
    let dir = if let Ok(custom) = std::env::var("PHOENIX_WIDGETS_CONFIG_DIR") {
        PathBuf::from(custom)
    } else {
        let base_dir = dirs::home_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(".config");
        let env = std::env::var("PHOENIX_WIDGETS_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("phoenix-widgets-dev")
        } else {
            base_dir.join("phoenix-widgets")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || CoreError::from(ConfigError::UnknownKey(key.to_string()));
        let invalid = |message: String| {
            CoreError::from(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value)?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Overwrite the config file with defaults and return them.
    pub fn reset() -> Result<Self> {
        let cfg = Self::default();
        cfg.save()?;
        Ok(cfg)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default config");
                Self::default()
            }
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The result must still validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the updated settings are inconsistent.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.engine_settings().validate()?;
        *self = updated;
        Ok(())
    }

    /// Engine settings described by this config.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            constraints: self.constraints.clone(),
            relevance: self.relevance.clone(),
            lifecycle: self.lifecycle.clone(),
            drivers: self.drivers.clone(),
            grid_step: self.placement.grid_step,
            tick_quantum_ms: self.tracking.tick_quantum_ms,
        }
    }
}
