//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{APP_NAME, DEFAULT_SYNC_DEBOUNCE_MS};
use crate::services::display::DisplayOptions;

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "JOYMAPPER_CONFIG_DIR";

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Game default profile describing the option trees
    /// (e.g. "`.../Data/Libs/Config/defaultProfile.xml`")
    #[serde(default)]
    pub default_profile: Option<PathBuf>,
    /// Directory holding saved `.sccontrols` profiles
    #[serde(default)]
    pub profiles_dir: Option<PathBuf>,
}

/// Outbound sync settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Quiet period after the last edit before a sync fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_SYNC_DEBOUNCE_MS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show the read-only sensitivity curves section for gamepads and joysticks
    #[serde(default = "default_true")]
    pub show_curves_section: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_curves_section: true,
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/JoyMapper/config.toml`
/// - macOS: `~/Library/Application Support/JoyMapper/config.toml`
/// - Windows: `%APPDATA%\JoyMapper\config.toml`
///
/// `JOYMAPPER_CONFIG_DIR` replaces the directory on every platform.
///
/// # Validation
///
/// - `default_profile` must exist if set
/// - `debounce_ms` must be greater than zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Sync settings
    #[serde(default)]
    pub sync: SyncConfig,
    /// Display preferences
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path.
    ///
    /// - Linux: `~/.config/JoyMapper/`
    /// - macOS: `~/Library/Application Support/JoyMapper/`
    /// - Windows: `%APPDATA%\JoyMapper\`
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit file.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to an explicit file.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - Default profile path exists (if set)
    /// - Debounce interval is non-zero
    pub fn validate(&self) -> Result<()> {
        if let Some(profile) = &self.paths.default_profile {
            if !profile.exists() {
                anyhow::bail!("Default profile does not exist: {}", profile.display());
            }
        }

        if self.sync.debounce_ms == 0 {
            anyhow::bail!("sync.debounce_ms must be greater than zero");
        }

        Ok(())
    }

    /// Sets a value by its dotted key (e.g. `sync.debounce_ms`), then validates.
    ///
    /// An empty value clears optional paths.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let optional_path = |v: &str| (!v.is_empty()).then(|| PathBuf::from(v));

        match key {
            "paths.default_profile" => self.paths.default_profile = optional_path(value),
            "paths.profiles_dir" => self.paths.profiles_dir = optional_path(value),
            "sync.debounce_ms" => {
                self.sync.debounce_ms = value
                    .trim()
                    .parse()
                    .context(format!("Invalid debounce interval: '{value}'"))?;
            }
            "display.show_curves_section" => {
                self.display.show_curves_section = value
                    .trim()
                    .parse()
                    .context(format!("Expected true or false, got '{value}'"))?;
            }
            other => anyhow::bail!("Unknown config key '{}'", other),
        }

        self.validate()
    }

    /// Directory where profiles are saved, defaulting to `<config>/profiles`.
    pub fn profiles_dir(&self) -> Result<PathBuf> {
        match &self.paths.profiles_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::config_dir()?.join("profiles")),
        }
    }

    /// Debounce interval as a duration.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.sync.debounce_ms)
    }

    /// Display options derived from the preferences.
    #[must_use]
    pub const fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            include_curves: self.display.show_curves_section,
        }
    }
}
