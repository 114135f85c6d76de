//! Progression storage settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// `[progression]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionSettings {
    /// SQLite database path (defaults to ~/.coco/progression.db)
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}
