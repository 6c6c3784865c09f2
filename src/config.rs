//! Studio configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by an optional `config.toml` in the configuration directory
//! (`--config-dir`, default `.`).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [remote]
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//! model = "gemini-2.5-flash-image"
//! api_key_env = "API_KEY"   # Environment variable holding the API key
//! # timeout_secs = 120      # Omit for no timeout
//!
//! [compress]
//! quality = 80              # JPEG quality (1-100)
//! aspect_lock = true        # Keep width/height ratio when editing one
//!
//! [convert]
//! format = "png"            # png, jpeg or webp
//! quality = 92              # Ignored by png and webp
//!
//! [download]
//! file_stem = "enhanced-image"
//!
//! [limits]
//! max_surface_dimension = 16384
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::codec::MimeType;
use crate::imaging::rust_backend::DEFAULT_MAX_SURFACE_DIMENSION;
use crate::imaging::{ConversionOptions, Quality};
use crate::remote::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::studio::SessionDefaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Studio configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Generative edit service settings.
    pub remote: RemoteConfig,
    /// Compress mode defaults.
    pub compress: CompressConfig,
    /// Convert mode defaults.
    pub convert: ConvertConfig,
    /// Download naming.
    pub download: DownloadConfig,
    /// Drawing surface limits.
    pub limits: LimitsConfig,
}

impl StudioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_quality("compress.quality", self.compress.quality)?;
        check_quality("convert.quality", self.convert.quality)?;
        if self.limits.max_surface_dimension == 0 {
            return Err(ConfigError::Validation(
                "limits.max_surface_dimension must be non-zero".into(),
            ));
        }
        for (key, value) in [
            ("remote.endpoint", &self.remote.endpoint),
            ("remote.model", &self.remote.model),
            ("remote.api_key_env", &self.remote.api_key_env),
            ("download.file_stem", &self.download.file_stem),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    /// Option values a fresh session starts from, and "start over" returns to.
    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            compression_quality: Quality::new(self.compress.quality),
            aspect_lock: self.compress.aspect_lock,
            conversion: ConversionOptions {
                target_format: self.convert.format,
                quality: Quality::new(self.convert.quality),
            },
            file_stem: self.download.file_stem.clone(),
        }
    }
}

fn check_quality(key: &str, quality: u32) -> Result<(), ConfigError> {
    if !(1..=100).contains(&quality) {
        return Err(ConfigError::Validation(format!("{key} must be 1-100")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout. Absent means the request may take as long as it takes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "API_KEY".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressConfig {
    pub quality: u32,
    pub aspect_lock: bool,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            quality: 80,
            aspect_lock: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    pub format: MimeType,
    pub quality: u32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            format: MimeType::Png,
            quality: 92,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    pub file_stem: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            file_stem: "enhanced-image".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Longest raster edge the drawing surface will allocate.
    pub max_surface_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_surface_dimension: DEFAULT_MAX_SURFACE_DIMENSION,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(StudioConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StudioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StudioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<StudioConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(?config, "configuration resolved");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Photo Enhancer Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Generative edit service (colorize, remove background, remove watermark)
# ---------------------------------------------------------------------------
[remote]
endpoint = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-2.5-flash-image"

# Environment variable the API key is read from.
api_key_env = "API_KEY"

# Request timeout in seconds. Leave unset to wait for the service.
# timeout_secs = 120

# ---------------------------------------------------------------------------
# Compress mode (output is always JPEG)
# ---------------------------------------------------------------------------
[compress]
# JPEG quality (1 = smallest, 100 = best).
quality = 80

# Keep the original aspect ratio when editing width or height.
aspect_lock = true

# ---------------------------------------------------------------------------
# Convert mode
# ---------------------------------------------------------------------------
[convert]
# Target format: "png", "jpeg" or "webp".
format = "png"

# Encoding quality (1-100). Only JPEG uses it.
quality = 92

# ---------------------------------------------------------------------------
# Downloads
# ---------------------------------------------------------------------------
[download]
# Result files are written as <file_stem>.<ext>.
file_stem = "enhanced-image"

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
[limits]
# Longest raster edge, in pixels, the drawing surface will allocate.
max_surface_dimension = 16384
"##
}
