//! Configuration loading and management

mod io;
mod progression;
mod retry;

pub use progression::ProgressionSettings;
pub use retry::RetrySettings;

use serde::{Deserialize, Serialize};

/// Main configuration structure (`~/.coco/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backoff settings for network-backed actions
    #[serde(default)]
    pub retry: RetrySettings,

    /// Progression storage settings
    #[serde(default)]
    pub progression: ProgressionSettings,
}
