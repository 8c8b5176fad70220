//! Optional TOML configuration read at start-up.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use last_bus_core::{
    metrics::{DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH},
    Difficulty, PhysicsParams,
};
use serde::Deserialize;

/// Settings that command-line flags may override.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) level: Option<u32>,
    pub(crate) viewport: Viewport,
    pub(crate) audio: AudioConfig,
    pub(crate) physics: PhysicsParams,
}

/// Visible area the camera clamps to.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Viewport {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEW_WIDTH,
            height: DEFAULT_VIEW_HEIGHT,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AudioConfig {
    pub(crate) enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Reads the configuration at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        if config.viewport.width <= 0.0 || config.viewport.height <= 0.0 {
            anyhow::bail!(
                "viewport must be positive, got {}x{}",
                config.viewport.width,
                config.viewport.height
            );
        }
        Ok(config)
    }
}
