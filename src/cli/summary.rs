//! Summary command implementation

use anyhow::Result;
use std::path::Path;

use super::{open_progression, print_json};

/// Print the player summary as JSON
pub fn summary_command(config_path: &Path) -> Result<()> {
    let (_config, progression) = open_progression(config_path)?;
    print_json(&progression.get_player_summary())
}
