//! Project configuration file support for storyforge.
//!
//! Loads `storyforge.toml` from the working directory, falling back to the
//! user config directory (`~/.config/storyforge/` on Linux).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use storyforge_autosave::AutoSaveConfig;
use storyforge_logging::LogFormat;

/// Project-level configuration loaded from `storyforge.toml`
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Console format for session events
    pub log_format: Option<LogFormat>,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: Option<String>,
    /// Auto-save timing
    #[serde(default)]
    pub autosave: AutoSaveConfig,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "storyforge.toml";

impl ProjectConfig {
    /// Load configuration from `dir`.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load_file(&config_path).map(Some)
    }

    /// Load an explicit config file. A missing file is an error here.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// First config found in the working directory, then the user config
    /// directory. Defaults when neither has one.
    pub fn discover(working_dir: &Path) -> Result<Self> {
        Self::discover_in(working_dir, user_config_dir().as_deref())
    }

    fn discover_in(working_dir: &Path, user_dir: Option<&Path>) -> Result<Self> {
        if let Some(config) = Self::load(working_dir)? {
            return Ok(config);
        }
        if let Some(dir) = user_dir {
            if let Some(config) = Self::load(dir)? {
                return Ok(config);
            }
        }
        Ok(Self::default())
    }
}

fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("storyforge"))
}
