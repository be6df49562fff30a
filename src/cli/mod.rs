//! CLI command implementations

pub mod backup;
pub mod complete;
pub mod init;
pub mod session;
pub mod summary;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use quiz_rewards::{Config, ProgressionStore, SystemClock};

/// Load the config and open the progression engine it describes
pub fn open_progression(config_path: &Path) -> Result<(Config, ProgressionStore)> {
    let config = Config::load_or_default(config_path)?;
    let mut progression = match config.open_store() {
        Ok(store) => ProgressionStore::new(
            store,
            Arc::new(SystemClock),
            &config.player.name,
            config.grade(),
        ),
        Err(e) => {
            tracing::warn!("Progress storage unavailable: {:#}", e);
            ProgressionStore::disabled(Arc::new(SystemClock), &config.player.name, config.grade())
        }
    };

    // The config file is the source of truth for identity
    if progression.profile().grade != config.grade() {
        progression.set_grade(config.grade());
    }
    if progression.profile().player_name != config.player.name {
        progression.set_player_name(&config.player.name);
    }
    Ok((config, progression))
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
