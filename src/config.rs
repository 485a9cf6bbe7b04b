//! Repository-local configuration in `.git/grove/config.toml`.
//!
//! The file is user-authored; grove only reads it.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name for grove metadata within `.git/`
const GROVE_DIR: &str = "grove";

/// Filename for the configuration
const CONFIG_FILE: &str = "config.toml";

/// Grove configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote to land against
    pub remote: String,
    /// Trunk branch override; None means trust the stack metadata
    pub trunk: Option<String>,
    /// Stack-tool integration toggle
    pub stack: StackConfig,
}

/// Stack-tool section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Whether Graphite integration is enabled
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            trunk: None,
            stack: StackConfig::default(),
        }
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Path of the config file under `repo_root`
pub fn config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(".git").join(GROVE_DIR).join(CONFIG_FILE)
}

/// Load configuration, falling back to defaults when the file is absent.
pub fn load_config(repo_root: &Path) -> Result<Config> {
    let path = config_path(repo_root);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}
