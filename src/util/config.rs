//! Configuration file support for Stencil.
//!
//! Stencil supports two configuration file locations:
//! - Global: `~/.stencil/config.toml` - User-wide defaults
//! - Project: `.stencil/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Stencil configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation settings
    pub generate: GenerateConfig,
}

/// Generation-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Number of targets rendered in parallel (None = one per CPU)
    pub jobs: Option<usize>,

    /// Run the cycle check on every marshal target that does not set it
    pub check_cycles: Option<bool>,

    /// Header file used when the manifest declares no header
    pub header_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.generate.jobs.is_some() {
            self.generate.jobs = other.generate.jobs;
        }
        if other.generate.check_cycles.is_some() {
            self.generate.check_cycles = other.generate.check_cycles;
        }
        if other.generate.header_file.is_some() {
            self.generate.header_file = other.generate.header_file;
        }
    }

    /// Effective number of parallel jobs, at least one.
    pub fn jobs(&self) -> usize {
        self.generate
            .jobs
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
            .max(1)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.stencil/config.toml)
/// 2. Global config (~/.stencil/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global stencil config directory (~/.stencil).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".stencil"))
}

/// Get the project config path (.stencil/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".stencil").join("config.toml")
}
