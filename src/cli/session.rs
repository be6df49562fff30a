//! Session command implementation

use anyhow::{Result, bail};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use quiz_rewards::session::Sticker;
use quiz_rewards::{Config, Feedback, SessionRewardEngine, SessionSummary, SystemClock};

use super::print_json;

#[derive(Serialize)]
struct SessionReport {
    feedback: Vec<Feedback>,
    summary: SessionSummary,
    /// Display names of the stickers in `summary`
    sticker_labels: Vec<&'static str>,
}

/// Parse "1101" style answers
fn parse_answers(answers: &str) -> Result<Vec<bool>> {
    answers
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c {
            '1' | 'y' | 'Y' => Ok(true),
            '0' | 'n' | 'N' => Ok(false),
            other => bail!("Invalid answer '{}': use 1 for correct, 0 for wrong", other),
        })
        .collect()
}

/// Replay answers through a fresh session and print every feedback
pub fn session_command(config_path: &Path, answers: &str, grade: Option<u8>) -> Result<()> {
    let answers = parse_answers(answers)?;
    let config = Config::load_or_default(config_path)?;

    // Snapshots are best effort; a store that fails to open just means none
    let store = match config.open_store() {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!("Session snapshot disabled: {:#}", e);
            None
        }
    };

    let mut engine = SessionRewardEngine::new(
        grade.unwrap_or_else(|| config.grade()),
        Arc::new(SystemClock),
        store,
    );

    let feedback = answers
        .into_iter()
        .map(|answer| engine.process_answer(answer))
        .collect();

    let summary = engine.get_session_summary();
    let sticker_labels = summary.stickers.iter().map(Sticker::label).collect();
    print_json(&SessionReport {
        feedback,
        summary,
        sticker_labels,
    })
}
