//! Command-line configuration.
//!
//! The library itself takes no configuration; this module only serves the
//! `imginfo` binary. Settings come from three layers, later layers winning:
//!
//! 1. stock defaults ([`InspectConfig::default`])
//! 2. a TOML file: `--config <path>`, or `imginfo.toml` in the working
//!    directory when present
//! 3. command-line flags (applied by the binary after loading)
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnail]
//! max_width = 200           # Preview bounding box
//! max_height = 200
//!
//! [listing]
//! sort = true               # Sort folder listings by file name
//!
//! [report]
//! format = "text"           # "text" or "json"
//! show_path = false         # Include the absolute path in text reports
//! ```
//!
//! Files are sparse: override just the keys you want. Unknown keys are
//! rejected to catch typos early.

use crate::imaging::BoundingBox;
use crate::scan::ListOrder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "imginfo.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectConfig {
    pub thumbnail: ThumbnailConfig,
    pub listing: ListingConfig,
    pub report: ReportConfig,
}

impl InspectConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnail.max_width == 0 || self.thumbnail.max_height == 0 {
            return Err(ConfigError::Validation(
                "thumbnail.max_width and thumbnail.max_height must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Preview bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        let bounds = BoundingBox::default();
        Self {
            max_width: bounds.width,
            max_height: bounds.height,
        }
    }
}

impl ThumbnailConfig {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.max_width, self.max_height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Sort folder listings by file name.
    pub sort: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { sort: true }
    }
}

impl ListingConfig {
    pub fn order(&self) -> ListOrder {
        if self.sort {
            ListOrder::Name
        } else {
            ListOrder::Filesystem
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub format: ReportFormat,
    /// Include the absolute path row in text reports.
    pub show_path: bool,
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user files are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(InspectConfig::default())?)
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

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<InspectConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: InspectConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// An `explicit` path must exist. Without one, `imginfo.toml` in `cwd` is
/// used when present and stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<InspectConfig, ConfigError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(cwd.join(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };
    let overlay = match &path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Some(load_raw_config(path)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `imginfo.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imginfo configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# imginfo reads ./imginfo.toml when present, or the file given with
# --config. Command-line flags override values from the file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnail]
# Bounding box for previews. Aspect ratio is always preserved and images
# smaller than the box are never enlarged. Both values must be non-zero.
max_width = 200
max_height = 200

# ---------------------------------------------------------------------------
# Folder listing
# ---------------------------------------------------------------------------
[listing]
# Sort folder listings by file name. When false, files appear in whatever
# order the filesystem returns them.
sort = true

# ---------------------------------------------------------------------------
# Reports
# ---------------------------------------------------------------------------
[report]
# "text" for a human-readable report, "json" for one JSON object per file.
format = "text"

# Include the absolute file path in text reports.
show_path = false
"##
}
