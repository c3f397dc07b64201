//! Configuration settings for offline-queue.
//!
//! Settings are loaded from `~/.offline-queue/config.yaml`.

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::OfflineError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Queue behavior.
    pub queue: QueueConfig,
    /// Snapshot serialization.
    pub serializer: SerializerConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorSetting {
    /// Apply this setting to `colored`'s global override.
    pub fn apply(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

/// Queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Record saved changes in the operations queue.
    #[serde(default = "default_true")]
    pub add_changes_to_queue: bool,
}

/// Snapshot serializer settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SerializerConfig {
    /// Write indented JSON snapshots.
    pub pretty: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

const fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            add_changes_to_queue: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, OfflineError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, OfflineError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            OfflineError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            OfflineError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Save configuration to the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<(), OfflineError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        self.save_to_path(&paths.config_file)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), OfflineError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| OfflineError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            OfflineError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }
}
