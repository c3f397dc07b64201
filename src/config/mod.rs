//! Configuration management for offline-queue.
//!
//! This module handles loading and saving configuration from `~/.offline-queue/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{
    ColorSetting, Config, GeneralConfig, LoggingConfig, QueueConfig, SerializerConfig,
};
