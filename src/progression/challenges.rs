//! Daily and weekly challenges
//!
//! Daily challenges are regenerated the first time the set is touched on a
//! new calendar day; weekly challenges when the running week number changes
//! (see [`crate::clock::week_number`]). Progress only ever moves forward and a
//! challenge completes at most once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::models::ExerciseResults;
use crate::clock::{day_key, week_number};
use crate::features::FeatureFlags;

/// What a challenge measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Exercises finished
    Exercises,
    /// Correct answers in a row within one exercise
    Streak,
    /// Minutes practiced
    Time,
    /// Accuracy percentage in one exercise
    Accuracy,
    /// Consecutive practice days
    DailyStreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePeriod {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeReward {
    pub xp: u32,
    /// Achievement ID unlocked on completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    pub period: ChallengePeriod,
    pub title: String,
    pub description: String,
    pub target: u32,
    pub progress: u32,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub reward: ChallengeReward,
}

impl Challenge {
    fn new(
        id: String,
        kind: ChallengeKind,
        period: ChallengePeriod,
        title: &str,
        description: String,
        target: u32,
        reward: ChallengeReward,
    ) -> Self {
        Self {
            id,
            kind,
            period,
            title: title.to_string(),
            description,
            target,
            progress: 0,
            completed: false,
            completed_at: None,
            reward,
        }
    }

    /// Progress as a fraction (0.0 - 1.0)
    pub fn progress_fraction(&self) -> f32 {
        if self.completed || self.target == 0 {
            1.0
        } else {
            (self.progress as f32 / self.target as f32).min(1.0)
        }
    }

    /// Apply one exercise; returns true when this call completed the challenge
    fn apply(&mut self, results: &ExerciseResults, daily_streak: u32, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }

        let next = match self.kind {
            ChallengeKind::Exercises => self.progress.saturating_add(1),
            ChallengeKind::Streak => results.max_streak,
            ChallengeKind::Time => self.progress.saturating_add(results.minutes_spent()),
            ChallengeKind::Accuracy => results.accuracy_percent().round() as u32,
            ChallengeKind::DailyStreak => daily_streak,
        };
        self.progress = self.progress.max(next);

        if self.progress >= self.target {
            self.completed = true;
            self.completed_at = Some(now);
            info!("Challenge completed: {} (+{} XP)", self.title, self.reward.xp);
            return true;
        }
        false
    }
}

/// Daily challenge targets
pub const DAILY_EXERCISES_TARGET: u32 = 3;
pub const DAILY_STREAK_TARGET: u32 = 5;
pub const DAILY_MINUTES_TARGET: u32 = 10;
pub const DAILY_ACCURACY_TARGET: u32 = 80;

/// Weekly challenge targets
pub const WEEKLY_EXERCISES_TARGET: u32 = 15;
pub const WEEKLY_DAYS_TARGET: u32 = 5;

/// Daily set for `today`
pub fn generate_daily(today: NaiveDate, flags: &FeatureFlags) -> Vec<Challenge> {
    if !flags.challenges {
        return Vec::new();
    }
    let key = day_key(today);
    let reward = |xp| ChallengeReward { xp, badge: None };

    let mut daily = vec![
        Challenge::new(
            format!("exercises_{key}"),
            ChallengeKind::Exercises,
            ChallengePeriod::Daily,
            "Busy Bee",
            format!("Finish {DAILY_EXERCISES_TARGET} exercises today"),
            DAILY_EXERCISES_TARGET,
            reward(30),
        ),
        Challenge::new(
            format!("streak_{key}"),
            ChallengeKind::Streak,
            ChallengePeriod::Daily,
            "Hot Streak",
            format!("Get {DAILY_STREAK_TARGET} answers right in a row"),
            DAILY_STREAK_TARGET,
            reward(40),
        ),
        Challenge::new(
            format!("time_{key}"),
            ChallengeKind::Time,
            ChallengePeriod::Daily,
            "Practice Time",
            format!("Practice for {DAILY_MINUTES_TARGET} minutes today"),
            DAILY_MINUTES_TARGET,
            reward(25),
        ),
    ];

    if flags.accuracy_challenge {
        daily.push(Challenge::new(
            format!("accuracy_{key}"),
            ChallengeKind::Accuracy,
            ChallengePeriod::Daily,
            "Sharpshooter",
            format!("Reach {DAILY_ACCURACY_TARGET}% accuracy in an exercise"),
            DAILY_ACCURACY_TARGET,
            reward(50),
        ));
    }

    daily
}

/// Weekly set for running week `week`
pub fn generate_weekly(week: i64, flags: &FeatureFlags) -> Vec<Challenge> {
    if !flags.challenges {
        return Vec::new();
    }

    vec![
        Challenge::new(
            format!("weekly_exercises_w{week}"),
            ChallengeKind::Exercises,
            ChallengePeriod::Weekly,
            "Weekly Warrior",
            format!("Finish {WEEKLY_EXERCISES_TARGET} exercises this week"),
            WEEKLY_EXERCISES_TARGET,
            ChallengeReward {
                xp: 150,
                badge: Some("weekly_warrior".to_string()),
            },
        ),
        Challenge::new(
            format!("weekly_days_w{week}"),
            ChallengeKind::DailyStreak,
            ChallengePeriod::Weekly,
            "Dedicated Learner",
            format!("Practice {WEEKLY_DAYS_TARGET} days in a row this week"),
            WEEKLY_DAYS_TARGET,
            ChallengeReward {
                xp: 200,
                badge: Some("dedicated_learner".to_string()),
            },
        ),
    ]
}

/// Persistent challenge state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeSet {
    /// Day key the daily set belongs to
    pub generated_date: Option<String>,
    /// Running week number the weekly set belongs to
    pub week_number: Option<i64>,
    #[serde(default)]
    pub daily: Vec<Challenge>,
    #[serde(default)]
    pub weekly: Vec<Challenge>,
}

impl ChallengeSet {
    /// Regenerate whichever sets are stale for `today`.
    ///
    /// Returns true if anything was regenerated.
    pub fn ensure_current(&mut self, today: NaiveDate, flags: &FeatureFlags) -> bool {
        let key = day_key(today);
        let week = week_number(today);
        let mut changed = false;

        if self.generated_date.as_deref() != Some(key.as_str()) {
            debug!("Generating daily challenges for {}", key);
            self.daily = generate_daily(today, flags);
            self.generated_date = Some(key);
            changed = true;
        }

        if self.week_number != Some(week) {
            debug!("Generating weekly challenges for week {}", week);
            self.weekly = generate_weekly(week, flags);
            self.week_number = Some(week);
            changed = true;
        }

        changed
    }

    /// Apply one exercise to every incomplete challenge.
    ///
    /// Returns the challenges this call completed; the caller grants their
    /// rewards. Completed challenges are never returned twice.
    pub fn update(
        &mut self,
        results: &ExerciseResults,
        daily_streak: u32,
        now: DateTime<Utc>,
    ) -> Vec<Challenge> {
        self.daily
            .iter_mut()
            .chain(self.weekly.iter_mut())
            .filter_map(|c| c.apply(results, daily_streak, now).then(|| c.clone()))
            .collect()
    }

    /// Daily then weekly challenges
    pub fn all(&self) -> impl Iterator<Item = &Challenge> {
        self.daily.iter().chain(self.weekly.iter())
    }
}
