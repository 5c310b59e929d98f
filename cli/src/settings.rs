//! Run settings: an optional TOML file, overridden by command-line flags.

use std::path::Path;

use anyhow::{Context, Result};
use nfer_core::OverlapConfig;
use serde::Deserialize;

/// Activation radius given to every loaded entity unless configured.
pub const DEFAULT_RADIUS_METRES: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub radius_metres: f64,
    pub overlap: OverlapConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            radius_metres: DEFAULT_RADIUS_METRES,
            overlap: OverlapConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid settings file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_toml_str(&text)
    }
}
