//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{DecalError, DecalResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Transform bounds and geometry constants.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Default export settings.
    #[serde(default)]
    pub export: ExportDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bounds for the overlay transform and the constants that tie overlay
/// size to surface size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smallest allowed scale multiplier.
    pub min_scale: f64,

    /// Largest allowed scale multiplier.
    pub max_scale: f64,

    /// Smallest allowed opacity.
    pub min_opacity: f64,

    /// Largest allowed opacity.
    pub max_opacity: f64,

    /// Opacity applied when a new base image is loaded.
    pub default_opacity: f64,

    /// Fraction of the shorter surface side at which a resize handle
    /// distance maps to `scale == 1`.
    pub resize_calibration: f64,

    /// Fraction of the shorter destination side used as the overlay's
    /// nominal width at `scale == 1`.
    pub overlay_reference_fraction: f64,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Suggested filename for the downloadable composite.
    pub file_name: String,

    /// Output encoding.
    pub format: OutputFormat,
}

/// Encoded raster format for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "decal=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            max_scale: 4.0,
            min_opacity: 0.1,
            max_opacity: 1.0,
            default_opacity: 0.92,
            resize_calibration: 0.2,
            overlay_reference_fraction: 0.32,
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            file_name: "decal-composite.png".to_string(),
            format: OutputFormat::Png,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EngineConfig {
    /// Reject bounds that would make the transform invariants unsatisfiable.
    pub fn validate(&self) -> DecalResult<()> {
        let values = [
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("min_opacity", self.min_opacity),
            ("max_opacity", self.max_opacity),
            ("default_opacity", self.default_opacity),
            ("resize_calibration", self.resize_calibration),
            ("overlay_reference_fraction", self.overlay_reference_fraction),
        ];
        for (name, value) in values {
            if !value.is_finite() || value <= 0.0 {
                return Err(DecalError::config(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if self.min_scale > self.max_scale {
            return Err(DecalError::config(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if self.min_opacity > self.max_opacity || self.max_opacity > 1.0 {
            return Err(DecalError::config(format!(
                "opacity bounds [{}, {}] must lie within (0, 1]",
                self.min_opacity, self.max_opacity
            )));
        }
        if !(self.min_opacity..=self.max_opacity).contains(&self.default_opacity) {
            return Err(DecalError::config(format!(
                "default_opacity {} is outside [{}, {}]",
                self.default_opacity, self.min_opacity, self.max_opacity
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                    Ok(config) => match config.engine.validate() {
                        Ok(()) => return config,
                        Err(e) => {
                            tracing::warn!("Ignoring config at {:?}: {}", config_path, e);
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("decal").join("config.json")
}
