//! Export, import and reset commands

use anyhow::{Context, Result, bail};
use std::path::Path;

use super::open_progression;

/// Write a backup to `output`, or stdout
pub fn export_command(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let (_config, progression) = open_progression(config_path)?;
    let json = progression.export_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write backup: {}", path.display()))?;
            println!("Exported: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Replace all progress with a backup
pub fn import_command(config_path: &Path, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read backup: {}", file.display()))?;

    let (_config, mut progression) = open_progression(config_path)?;
    progression
        .import_json(&json)
        .with_context(|| format!("Failed to import backup: {}", file.display()))?;

    let profile = progression.profile();
    println!(
        "Imported: {} (level {}, {} XP)",
        profile.player_name, profile.level, profile.lifetime_xp
    );
    Ok(())
}

/// Wipe all progress
pub fn reset_command(config_path: &Path, yes: bool) -> Result<()> {
    if !yes {
        bail!("Resetting deletes all progress. Re-run with --yes to confirm.");
    }

    let (_config, mut progression) = open_progression(config_path)?;
    if !progression.is_enabled() {
        bail!("Progress storage is unavailable; nothing to reset");
    }
    progression.reset_progress();
    println!("Progress reset for {}", progression.profile().player_name);
    Ok(())
}
