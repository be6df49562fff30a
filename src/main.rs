use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use quiz_rewards::Config;

mod cli;

#[derive(Parser)]
#[command(name = "quiz-rewards")]
#[command(about = "Progression and rewards for quiz practice")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.quiz-rewards/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the player's progress
    Summary,

    /// Record a finished exercise
    Complete(cli::complete::CompleteArgs),

    /// Replay a session from a string of answers (1 = correct, 0 = wrong)
    Session {
        #[arg(long)]
        answers: String,

        /// Grade to play at (defaults to the configured grade)
        #[arg(long)]
        grade: Option<u8>,
    },

    /// Write a backup of all progress
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore progress from a backup
    Import {
        /// Backup file written by `export`
        file: PathBuf,
    },

    /// Create a new configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,

        /// Player name
        #[arg(long)]
        name: Option<String>,

        /// Grade (1-8)
        #[arg(long)]
        grade: Option<u8>,
    },

    /// Delete all progress, keeping name and grade
    Reset {
        /// Required; resetting cannot be undone
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(Config::global_config_path);

    match cli.command {
        Some(Commands::Summary) | None => {
            cli::summary::summary_command(&config_path)?;
        }
        Some(Commands::Complete(args)) => {
            cli::complete::complete_command(&config_path, args)?;
        }
        Some(Commands::Session { answers, grade }) => {
            cli::session::session_command(&config_path, &answers, grade)?;
        }
        Some(Commands::Export { output }) => {
            cli::backup::export_command(&config_path, output.as_deref())?;
        }
        Some(Commands::Import { file }) => {
            cli::backup::import_command(&config_path, &file)?;
        }
        Some(Commands::Init { force, name, grade }) => {
            cli::init::init_command(&config_path, force, name, grade)?;
        }
        Some(Commands::Reset { yes }) => {
            cli::backup::reset_command(&config_path, yes)?;
        }
    }

    Ok(())
}
