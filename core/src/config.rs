//! Tracker configuration, loaded from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Realms to process, each `region:slug`.
    #[serde(default = "default_realms")]
    pub realms: Vec<String>,
    /// Directory the snapshot files live in.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    /// Path of the SQLite database file.
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

fn default_realms() -> Vec<String> {
    vec!["eu:fordragon".to_string()]
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("data/download")
}

fn default_database() -> PathBuf {
    PathBuf::from("data/result/tracker.db")
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            realms: default_realms(),
            snapshot_dir: default_snapshot_dir(),
            database: default_database(),
        }
    }
}

impl TrackerConfig {
    /// Load from a JSON file. Relative paths in the file are resolved
    /// against the file's own directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)?;
        if let Some(base) = path.parent() {
            if config.snapshot_dir.is_relative() {
                config.snapshot_dir = base.join(&config.snapshot_dir);
            }
            if config.database.is_relative() {
                config.database = base.join(&config.database);
            }
        }
        config.dump();
        Ok(config)
    }

    pub fn dump(&self) {
        log::info!("realms      : {:?}", self.realms);
        log::info!("snapshot dir: {}", self.snapshot_dir.display());
        log::info!("database    : {}", self.database.display());
    }
}
