//! Configuration loading from useprune.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::builder::UsePrune;
use crate::error::UsePruneError;

/// System-wide config file, read when present.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/useprune.toml";

/// Main configuration structure for useprune.toml.
///
/// Every field is optional; unset fields keep the built-in defaults.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UsePruneConfig {
    /// World file path.
    pub world: Option<PathBuf>,
    /// Installed-package database root.
    pub pkg_dir: Option<PathBuf>,
    /// Packages always counted as world (replaces the default list).
    pub extra_world: Option<Vec<String>>,
    /// Regex selecting the audited flags.
    pub target_pattern: Option<String>,
    /// Flags never reported.
    pub ignore_flags: Option<Vec<String>>,
}

impl UsePruneConfig {
    /// Applies the configured values on top of `builder`.
    pub fn apply(&self, mut builder: UsePrune) -> UsePrune {
        if let Some(world) = &self.world {
            builder = builder.world_file(world);
        }
        if let Some(dir) = &self.pkg_dir {
            builder = builder.pkg_dir(dir);
        }
        if let Some(extra) = &self.extra_world {
            builder = builder.extra_world(extra.iter().cloned());
        }
        if let Some(pattern) = &self.target_pattern {
            builder = builder.target_pattern(pattern);
        }
        if let Some(flags) = &self.ignore_flags {
            builder = builder.ignore_flags(flags.iter().cloned());
        }
        builder
    }
}

/// Loads configuration from `path`. The file must exist.
pub fn load_config(path: &Path) -> Result<UsePruneConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = toml::from_str(&content).map_err(|e| UsePruneError::config(path, e.to_string()))?;
    Ok(cfg)
}

/// Loads the system-wide config if it exists.
pub fn load_default_config() -> Result<Option<UsePruneConfig>> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_config(path).map(Some)
}
