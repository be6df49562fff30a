//! Achievement checking logic
//!
//! Evaluates achievement conditions against the current profile, streak and
//! stats. Only locked achievements are checked, and unlocking goes through
//! [`AchievementState::unlock`], so evaluating twice never unlocks twice.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::definitions::{ACHIEVEMENTS, Achievement, AchievementCondition};
use super::models::{AchievementState, PlayerProfile};
use super::stats::StatsState;
use super::streaks::DailyStreakState;

/// Answers needed in a category before mastery can unlock
pub const MIN_MASTERY_SAMPLES: u32 = 100;

/// State the conditions are evaluated against
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub profile: &'a PlayerProfile,
    pub streak: &'a DailyStreakState,
    pub stats: &'a StatsState,
}

/// Whether `condition` holds in `ctx`
pub fn condition_met(condition: &AchievementCondition, ctx: &CheckContext<'_>) -> bool {
    match *condition {
        AchievementCondition::TotalExercises(n) => ctx.profile.total_exercises >= n,
        AchievementCondition::TotalCorrect(n) => ctx.profile.total_correct >= n,
        AchievementCondition::DailyStreak(n) => ctx.streak.current_streak >= n,
        AchievementCondition::Level(n) => ctx.profile.level >= n,
        AchievementCondition::PerfectScores(n) => ctx.stats.perfect_scores >= n,
        AchievementCondition::CategoryMastery { category, accuracy } => {
            let tally = ctx.stats.category(category);
            if tally.total < MIN_MASTERY_SAMPLES {
                return false;
            }
            // Integer comparison avoids float rounding at the threshold
            u64::from(tally.correct) * 100 >= u64::from(accuracy) * u64::from(tally.total)
        }
        AchievementCondition::ChallengeBadge => false,
    }
}

/// Unlock every locked achievement whose condition now holds.
///
/// Returns the newly unlocked achievements in catalogue order.
pub fn evaluate(
    state: &mut AchievementState,
    ctx: &CheckContext<'_>,
    now: DateTime<Utc>,
) -> Vec<&'static Achievement> {
    let mut newly_unlocked = Vec::new();

    for achievement in ACHIEVEMENTS {
        if state.is_unlocked(achievement.id) {
            continue;
        }
        if condition_met(&achievement.condition, ctx) && state.unlock(achievement.id, now) {
            info!("Achievement unlocked: {} {}", achievement.emoji, achievement.title);
            newly_unlocked.push(achievement);
        }
    }

    newly_unlocked
}

/// Unlock a badge granted by a challenge.
///
/// Returns the achievement if this call unlocked it; unknown IDs and
/// already-unlocked badges return `None`.
pub fn unlock_badge(
    state: &mut AchievementState,
    id: &str,
    now: DateTime<Utc>,
) -> Option<&'static Achievement> {
    let achievement = Achievement::get(id)?;
    if state.unlock(achievement.id, now) {
        info!("Badge earned: {} {}", achievement.emoji, achievement.title);
        Some(achievement)
    } else {
        None
    }
}

/// Display progress towards one achievement
#[derive(Debug, Clone, Serialize)]
pub struct AchievementProgress {
    pub achievement: &'static Achievement,
    pub unlocked: bool,
    pub current: u32,
    pub target: u32,
}

impl AchievementProgress {
    /// Progress as a fraction (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.unlocked || self.target == 0 {
            1.0
        } else {
            (self.current as f32 / self.target as f32).min(1.0)
        }
    }
}

/// Current/target values for every achievement, for progress displays
pub fn progress(state: &AchievementState, ctx: &CheckContext<'_>) -> Vec<AchievementProgress> {
    ACHIEVEMENTS
        .iter()
        .map(|achievement| {
            let unlocked = state.is_unlocked(achievement.id);
            let (current, target) = match achievement.condition {
                AchievementCondition::TotalExercises(n) => (ctx.profile.total_exercises, n),
                AchievementCondition::TotalCorrect(n) => (ctx.profile.total_correct, n),
                AchievementCondition::DailyStreak(n) => (ctx.streak.current_streak, n),
                AchievementCondition::Level(n) => (ctx.profile.level, n),
                AchievementCondition::PerfectScores(n) => (ctx.stats.perfect_scores, n),
                AchievementCondition::CategoryMastery { category, accuracy } => {
                    let pct = ctx
                        .stats
                        .category_accuracy(category)
                        .map(|a| (a * 100.0).round() as u32)
                        .unwrap_or(0);
                    (pct, accuracy)
                }
                AchievementCondition::ChallengeBadge => (u32::from(unlocked), 1),
            };
            AchievementProgress {
                achievement,
                unlocked,
                current: current.min(target),
                target,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::models::ExerciseResults;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn results(category: &str, correct: u32, total: u32) -> ExerciseResults {
        ExerciseResults {
            exercise_id: "ex".to_string(),
            category: category.to_string(),
            grade: 4,
            correct_count: correct,
            total_count: total,
            time_spent_seconds: 60,
            max_streak: 0,
            hints_used: 0,
            perfect_score: false,
        }
    }

    #[test]
    fn test_first_exercise_unlocks_once() {
        let mut profile = PlayerProfile::new("Kim", 4, now());
        profile.total_exercises = 1;
        let streak = DailyStreakState::default();
        let stats = StatsState::default();
        let ctx = CheckContext {
            profile: &profile,
            streak: &streak,
            stats: &stats,
        };

        let mut state = AchievementState::default();
        let first = evaluate(&mut state, &ctx, now());
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "first_exercise");

        let second = evaluate(&mut state, &ctx, now());
        assert!(second.is_empty());
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn test_streak_and_level_conditions() {
        let mut profile = PlayerProfile::new("Kim", 4, now());
        profile.level = 10;
        let streak = DailyStreakState {
            current_streak: 7,
            longest_streak: 7,
            ..Default::default()
        };
        let stats = StatsState::default();
        let ctx = CheckContext {
            profile: &profile,
            streak: &streak,
            stats: &stats,
        };

        let mut state = AchievementState::default();
        let ids: Vec<_> = evaluate(&mut state, &ctx, now()).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["streak_3", "streak_7", "level_5", "level_10"]);
    }

    #[test]
    fn test_mastery_needs_minimum_samples() {
        let profile = PlayerProfile::new("Kim", 4, now());
        let streak = DailyStreakState::default();
        let mut stats = StatsState::default();
        stats.record(&results("addition", 50, 50), "2024-01-01");

        let condition = AchievementCondition::CategoryMastery {
            category: "addition",
            accuracy: 90,
        };
        {
            let ctx = CheckContext {
                profile: &profile,
                streak: &streak,
                stats: &stats,
            };
            // Perfect accuracy but only 50 answers
            assert!(!condition_met(&condition, &ctx));
        }

        stats.record(&results("addition", 40, 50), "2024-01-02");
        let ctx = CheckContext {
            profile: &profile,
            streak: &streak,
            stats: &stats,
        };
        // 90 of 100: exactly at the threshold
        assert!(condition_met(&condition, &ctx));
    }

    #[test]
    fn test_badges_never_unlock_from_conditions() {
        let mut profile = PlayerProfile::new("Kim", 4, now());
        profile.total_exercises = 10_000;
        let streak = DailyStreakState::default();
        let stats = StatsState::default();
        let ctx = CheckContext {
            profile: &profile,
            streak: &streak,
            stats: &stats,
        };
        let mut state = AchievementState::default();
        evaluate(&mut state, &ctx, now());
        assert!(!state.is_unlocked("weekly_warrior"));

        assert!(unlock_badge(&mut state, "weekly_warrior", now()).is_some());
        assert!(unlock_badge(&mut state, "weekly_warrior", now()).is_none());
        assert!(unlock_badge(&mut state, "unknown_badge", now()).is_none());
    }

    #[test]
    fn test_progress_report() {
        let mut profile = PlayerProfile::new("Kim", 4, now());
        profile.total_exercises = 7;
        let streak = DailyStreakState::default();
        let stats = StatsState::default();
        let ctx = CheckContext {
            profile: &profile,
            streak: &streak,
            stats: &stats,
        };
        let state = AchievementState::default();
        let report = progress(&state, &ctx);
        assert_eq!(report.len(), ACHIEVEMENTS.len());

        let ten = report.iter().find(|p| p.achievement.id == "ten_exercises").unwrap();
        assert_eq!((ten.current, ten.target), (7, 10));
        assert!((ten.fraction() - 0.7).abs() < 1e-6);

        let first = report.iter().find(|p| p.achievement.id == "first_exercise").unwrap();
        assert_eq!(first.current, 1);
    }
}
