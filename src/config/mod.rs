//! Configuration loading and management

mod io;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::features::clamp_grade;
use crate::storage::{FileStore, KeyValueStore, MemoryStore, SqliteStore};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Player identity used when no profile is stored yet
    #[serde(default)]
    pub player: PlayerConfig,

    /// Where progress is kept
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_name")]
    pub name: String,

    /// School year (1-8); out-of-range values are clamped
    #[serde(default = "default_grade")]
    pub grade: u8,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: default_player_name(),
            grade: default_grade(),
        }
    }
}

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_grade() -> u8 {
    3
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    File,
    /// Nothing survives the process
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database file (sqlite) or directory (file); defaults under `~/.quiz-rewards/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Path the backend will use
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        match self.backend {
            StorageBackend::Sqlite => Config::global_config_dir().join("progress.db"),
            StorageBackend::File => Config::global_config_dir().join("data"),
            StorageBackend::Memory => Config::global_config_dir(),
        }
    }
}

impl Config {
    /// Grade from the config, clamped into the supported range
    pub fn grade(&self) -> u8 {
        clamp_grade(self.player.grade)
    }

    /// Open the configured store
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        let path = self.storage.resolved_path();
        let store: Arc<dyn KeyValueStore> = match self.storage.backend {
            StorageBackend::Sqlite => Arc::new(
                SqliteStore::open(&path)
                    .with_context(|| format!("Failed to open database: {}", path.display()))?,
            ),
            StorageBackend::File => Arc::new(
                FileStore::open(&path)
                    .with_context(|| format!("Failed to open data directory: {}", path.display()))?,
            ),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}
