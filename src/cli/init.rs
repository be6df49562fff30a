//! Init command implementation

use anyhow::{Result, bail};
use std::path::Path;

use quiz_rewards::Config;
use quiz_rewards::features::clamp_grade;

/// Write a config file with defaults, optionally setting name and grade
pub fn init_command(
    config_path: &Path,
    force: bool,
    name: Option<String>,
    grade: Option<u8>,
) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    let mut config = Config::default();
    if let Some(name) = name {
        config.player.name = name;
    }
    if let Some(grade) = grade {
        config.player.grade = clamp_grade(grade);
    }

    config.save_to_file(config_path)?;
    println!("Created: {}", config_path.display());

    Ok(())
}
