//! Configuration file support for freight-builder.
//!
//! Two configuration file locations are consulted:
//! - Global: `~/.freight/config.toml` - User-wide defaults
//! - Project: `.freight/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::backend::BackendId;

/// freight-builder configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// External process settings
    pub process: ProcessConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Package manager backend (yum, dnf)
    pub backend: Option<String>,

    /// Directory the per-build workspace is created in (default: cwd)
    pub work_root: Option<PathBuf>,

    /// Default artifact output directory when the manifest names none
    pub output_path: Option<PathBuf>,
}

/// Settings for external tool invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Per-command timeout in seconds (None = wait indefinitely)
    pub timeout_secs: Option<u64>,
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
        if other.build.backend.is_some() {
            self.build.backend = other.build.backend;
        }
        if other.build.work_root.is_some() {
            self.build.work_root = other.build.work_root;
        }
        if other.build.output_path.is_some() {
            self.build.output_path = other.build.output_path;
        }

        if other.process.timeout_secs.is_some() {
            self.process.timeout_secs = other.process.timeout_secs;
        }
    }

    /// Parse backend from config string.
    pub fn backend(&self) -> Option<BackendId> {
        self.build.backend.as_ref().and_then(|s| {
            s.parse()
                .map_err(|e| tracing::warn!("ignoring configured backend: {}", e))
                .ok()
        })
    }

    /// Configured per-command timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.process.timeout_secs.map(Duration::from_secs)
    }
}

/// Get the global config directory (~/.freight).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".freight"))
}

/// Get the global config path (~/.freight/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.freight/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".freight").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.freight/config.toml)
/// 2. Global config (~/.freight/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}
