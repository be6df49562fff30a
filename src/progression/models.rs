//! Persistent progression data model

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::challenges::{Challenge, ChallengeSet};
use super::definitions::Achievement;
use super::levels::{DEFAULT_AVATAR, DEFAULT_THEME, xp_threshold};
use super::stats::StatsState;
use super::streaks::DailyStreakState;
use crate::features::FeatureFlags;

/// Outcome of one finished exercise, as reported by the quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResults {
    pub exercise_id: String,
    pub category: String,
    pub grade: u8,
    pub correct_count: u32,
    pub total_count: u32,
    pub time_spent_seconds: u32,
    /// Longest run of correct answers within the exercise
    pub max_streak: u32,
    #[serde(default)]
    pub hints_used: u32,
    #[serde(default)]
    pub perfect_score: bool,
}

impl ExerciseResults {
    /// Accuracy in percent (0.0 - 100.0); 0 for an empty exercise
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            f64::from(self.correct_count) / f64::from(self.total_count) * 100.0
        }
    }

    /// Average seconds spent per question, `None` for an empty exercise
    pub fn seconds_per_question(&self) -> Option<f64> {
        if self.total_count == 0 {
            None
        } else {
            Some(f64::from(self.time_spent_seconds) / f64::from(self.total_count))
        }
    }

    /// Time spent, rounded to whole minutes
    pub fn minutes_spent(&self) -> u32 {
        (f64::from(self.time_spent_seconds) / 60.0).round() as u32
    }
}

/// Player identity, leveling state, lifetime totals and cosmetics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_name: String,
    pub grade: u8,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,

    /// XP inside the current level; always below `xp_to_next_level`
    pub xp: u32,
    pub level: u32,
    pub xp_to_next_level: u32,
    /// All XP ever earned
    #[serde(default)]
    pub lifetime_xp: u64,

    pub total_exercises: u32,
    pub total_questions: u32,
    pub total_correct: u32,
    pub total_minutes: u32,

    pub unlocked_themes: BTreeSet<String>,
    pub unlocked_avatars: BTreeSet<String>,
    pub current_theme: String,
    pub current_avatar: String,

    // Reserved for grade 6+ prestige; nothing resets levels yet
    #[serde(default)]
    pub prestige_level: u32,
    #[serde(default)]
    pub prestige_points: u32,
}

impl PlayerProfile {
    pub fn new(player_name: &str, grade: u8, now: DateTime<Utc>) -> Self {
        Self {
            player_name: player_name.to_string(),
            grade,
            created_at: now,
            last_active_at: now,
            xp: 0,
            level: 1,
            xp_to_next_level: xp_threshold(1),
            lifetime_xp: 0,
            total_exercises: 0,
            total_questions: 0,
            total_correct: 0,
            total_minutes: 0,
            unlocked_themes: BTreeSet::from([DEFAULT_THEME.to_string()]),
            unlocked_avatars: BTreeSet::from([DEFAULT_AVATAR.to_string()]),
            current_theme: DEFAULT_THEME.to_string(),
            current_avatar: DEFAULT_AVATAR.to_string(),
            prestige_level: 0,
            prestige_points: 0,
        }
    }

    /// Fold one exercise into the lifetime totals
    pub fn record_exercise(&mut self, results: &ExerciseResults, now: DateTime<Utc>) {
        self.total_exercises = self.total_exercises.saturating_add(1);
        self.total_questions = self.total_questions.saturating_add(results.total_count);
        self.total_correct = self.total_correct.saturating_add(results.correct_count);
        self.total_minutes = self.total_minutes.saturating_add(results.minutes_spent());
        self.last_active_at = now;
    }
}

/// Unlocked achievement IDs; the set only ever grows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementState {
    pub unlocked: BTreeSet<String>,
    pub last_unlocked_at: Option<DateTime<Utc>>,
}

impl AchievementState {
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// Insert `id`; returns false if it was already unlocked
    pub fn unlock(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        if self.unlocked.contains(id) {
            return false;
        }
        self.unlocked.insert(id.to_string());
        self.last_unlocked_at = Some(now);
        true
    }

    pub fn count(&self) -> usize {
        self.unlocked.len()
    }
}

/// Returned by `ProgressionStore::complete_exercise`
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    pub enabled: bool,
    /// XP added by this call, including challenge rewards
    pub xp_earned: u32,
    pub leveled_up: bool,
    pub new_level: Option<u32>,
    pub completed_challenges: Vec<Challenge>,
    pub new_achievements: Vec<&'static Achievement>,
    pub total_xp: u64,
    pub current_level: u32,
    pub daily_streak: u32,
}

impl CompletionResult {
    /// Result reported while the engine runs without a store
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            xp_earned: 0,
            leveled_up: false,
            new_level: None,
            completed_challenges: Vec::new(),
            new_achievements: Vec::new(),
            total_xp: 0,
            current_level: 0,
            daily_streak: 0,
        }
    }
}

/// Read-only copy of all persistent state
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub profile: PlayerProfile,
    pub streak: DailyStreakState,
    pub achievements: AchievementState,
    pub challenges: ChallengeSet,
    pub stats: StatsState,
    pub features: FeatureFlags,
}

/// Returned by `ProgressionStore::get_player_summary`
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub enabled: bool,
    #[serde(flatten)]
    pub snapshot: Option<ProgressSnapshot>,
}
