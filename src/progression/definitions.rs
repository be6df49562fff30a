//! Achievement definitions and metadata
//!
//! All achievements are defined here with their unlock conditions. Unlocked
//! IDs are persisted as plain strings, so IDs must never be renamed.

use serde::Serialize;

use AchievementCondition::*;

/// Condition that unlocks an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AchievementCondition {
    TotalExercises(u32),
    TotalCorrect(u32),
    DailyStreak(u32),
    Level(u32),
    PerfectScores(u32),
    /// Lifetime accuracy (percent) in one category, over at least 100 answers
    CategoryMastery {
        category: &'static str,
        accuracy: u32,
    },
    /// Granted only as a challenge reward
    ChallengeBadge,
}

/// Static achievement metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    pub condition: AchievementCondition,
}

impl Achievement {
    /// Look up an achievement by ID
    pub fn get(id: &str) -> Option<&'static Achievement> {
        ACHIEVEMENTS.iter().find(|a| a.id == id)
    }

    /// All achievements
    pub fn all() -> &'static [Achievement] {
        ACHIEVEMENTS
    }

    /// Numeric target for display, `None` for badge-only achievements
    pub fn target(&self) -> Option<u32> {
        match self.condition {
            AchievementCondition::TotalExercises(n)
            | AchievementCondition::TotalCorrect(n)
            | AchievementCondition::DailyStreak(n)
            | AchievementCondition::Level(n)
            | AchievementCondition::PerfectScores(n) => Some(n),
            AchievementCondition::CategoryMastery { accuracy, .. } => Some(accuracy),
            AchievementCondition::ChallengeBadge => None,
        }
    }
}

const fn def(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    emoji: &'static str,
    condition: AchievementCondition,
) -> Achievement {
    Achievement {
        id,
        title,
        description,
        emoji,
        condition,
    }
}

pub static ACHIEVEMENTS: &[Achievement] = &[
    // Exercises
    def(
        "first_exercise",
        "First Steps",
        "Finish your first exercise",
        "🎯",
        TotalExercises(1),
    ),
    def(
        "ten_exercises",
        "Getting Going",
        "Finish 10 exercises",
        "🚀",
        TotalExercises(10),
    ),
    def(
        "fifty_exercises",
        "Hard Worker",
        "Finish 50 exercises",
        "💪",
        TotalExercises(50),
    ),
    def(
        "hundred_exercises",
        "Century",
        "Finish 100 exercises",
        "💯",
        TotalExercises(100),
    ),
    // Correct answers
    def(
        "correct_100",
        "Sharp Mind",
        "Give 100 correct answers",
        "🧠",
        TotalCorrect(100),
    ),
    def(
        "correct_500",
        "Brainiac",
        "Give 500 correct answers",
        "🎓",
        TotalCorrect(500),
    ),
    def(
        "correct_1000",
        "Genius",
        "Give 1000 correct answers",
        "🏆",
        TotalCorrect(1000),
    ),
    // Daily streaks
    def(
        "streak_3",
        "On a Roll",
        "Practice 3 days in a row",
        "🔥",
        DailyStreak(3),
    ),
    def(
        "streak_7",
        "Week Warrior",
        "Practice 7 days in a row",
        "📅",
        DailyStreak(7),
    ),
    def(
        "streak_14",
        "Unstoppable",
        "Practice 14 days in a row",
        "⚡",
        DailyStreak(14),
    ),
    def(
        "streak_30",
        "Habit Hero",
        "Practice 30 days in a row",
        "🌟",
        DailyStreak(30),
    ),
    // Levels
    def(
        "level_5",
        "Rising Star",
        "Reach level 5",
        "⭐",
        Level(5),
    ),
    def(
        "level_10",
        "Shining Star",
        "Reach level 10",
        "🌠",
        Level(10),
    ),
    def(
        "level_20",
        "Superstar",
        "Reach level 20",
        "👑",
        Level(20),
    ),
    // Perfect scores
    def(
        "perfect_1",
        "Flawless",
        "Get a perfect score",
        "✨",
        PerfectScores(1),
    ),
    def(
        "perfect_10",
        "Perfectionist",
        "Get 10 perfect scores",
        "💎",
        PerfectScores(10),
    ),
    def(
        "perfect_25",
        "Untouchable",
        "Get 25 perfect scores",
        "🏅",
        PerfectScores(25),
    ),
    // Category mastery
    def(
        "master_addition",
        "Addition Ace",
        "Reach 90% accuracy in addition",
        "➕",
        CategoryMastery {
            category: "addition",
            accuracy: 90,
        },
    ),
    def(
        "master_multiplication",
        "Times Table Titan",
        "Reach 90% accuracy in multiplication",
        "✖️",
        CategoryMastery {
            category: "multiplication",
            accuracy: 90,
        },
    ),
    def(
        "master_spelling",
        "Spelling Champion",
        "Reach 85% accuracy in spelling",
        "🔤",
        CategoryMastery {
            category: "spelling",
            accuracy: 85,
        },
    ),
    def(
        "master_reading",
        "Bookworm",
        "Reach 85% accuracy in reading",
        "📚",
        CategoryMastery {
            category: "reading",
            accuracy: 85,
        },
    ),
    // Challenge badges
    def(
        "weekly_warrior",
        "Weekly Warrior",
        "Finish 15 exercises in one week",
        "🗓️",
        ChallengeBadge,
    ),
    def(
        "dedicated_learner",
        "Dedicated Learner",
        "Practice on 5 days in one week",
        "🎖️",
        ChallengeBadge,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique() {
        let ids: HashSet<_> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
    }

    #[test]
    fn test_lookup() {
        let a = Achievement::get("streak_7").unwrap();
        assert_eq!(a.condition, AchievementCondition::DailyStreak(7));
        assert_eq!(a.target(), Some(7));
        assert!(Achievement::get("nope").is_none());
    }

    #[test]
    fn test_challenge_badges_defined() {
        for id in ["weekly_warrior", "dedicated_learner"] {
            let a = Achievement::get(id).unwrap();
            assert_eq!(a.condition, AchievementCondition::ChallengeBadge);
            assert_eq!(a.target(), None);
        }
    }

    #[test]
    fn test_serializes_condition_tag() {
        let a = Achievement::get("master_spelling").unwrap();
        let json = serde_json::to_value(a).unwrap();
        assert_eq!(json["condition"]["kind"], "category_mastery");
        assert_eq!(json["condition"]["value"]["category"], "spelling");
    }
}
