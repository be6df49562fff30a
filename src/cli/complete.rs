//! Complete command implementation

use anyhow::{Result, bail};
use clap::Args;
use std::path::Path;
use uuid::Uuid;

use quiz_rewards::ExerciseResults;

use super::{open_progression, print_json};

#[derive(Debug, Args)]
pub struct CompleteArgs {
    /// Exercise category, e.g. "multiplication"
    #[arg(long)]
    pub category: String,

    /// Correct answers
    #[arg(long)]
    pub correct: u32,

    /// Questions answered
    #[arg(long)]
    pub total: u32,

    /// Time spent in seconds
    #[arg(long, default_value_t = 0)]
    pub seconds: u32,

    /// Longest run of correct answers
    #[arg(long, default_value_t = 0)]
    pub max_streak: u32,

    #[arg(long, default_value_t = 0)]
    pub hints: u32,

    /// Exercise ID (random if omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Exercise grade (defaults to the configured grade)
    #[arg(long)]
    pub grade: Option<u8>,
}

/// Record one exercise and print the completion result
pub fn complete_command(config_path: &Path, args: CompleteArgs) -> Result<()> {
    if args.correct > args.total {
        bail!(
            "--correct ({}) cannot exceed --total ({})",
            args.correct,
            args.total
        );
    }
    if args.max_streak > args.correct {
        bail!(
            "--max-streak ({}) cannot exceed --correct ({})",
            args.max_streak,
            args.correct
        );
    }

    let (config, mut progression) = open_progression(config_path)?;

    let results = ExerciseResults {
        exercise_id: args.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        category: args.category,
        grade: args.grade.unwrap_or_else(|| config.grade()),
        correct_count: args.correct,
        total_count: args.total,
        time_spent_seconds: args.seconds,
        max_streak: args.max_streak,
        hints_used: args.hints,
        perfect_score: args.total > 0 && args.correct == args.total,
    };

    let result = progression.complete_exercise(&results);
    print_json(&result)
}
