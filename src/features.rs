//! Grade-based feature gating
//!
//! Which reward mechanics are active depends only on the learner's grade
//! (school year, 1-8). Grades outside that range are clamped.

use serde::{Deserialize, Serialize};

/// Lowest supported grade
pub const MIN_GRADE: u8 = 1;
/// Highest supported grade
pub const MAX_GRADE: u8 = 8;

/// Capability flags for one grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    // Grade 3+
    pub xp: bool,
    pub badges: bool,
    pub daily_streaks: bool,
    pub simple_unlocks: bool,

    // Grade 4+
    pub challenges: bool,
    pub avatar_customization: bool,

    // Grade 5+
    pub accuracy_challenge: bool,

    // Grade 6+
    pub leaderboard: bool,
    pub advanced_stats: bool,
    pub prestige: bool,
    pub combo_multiplier: bool,

    /// Session shield; available at every grade
    pub streak_shield: bool,
}

/// Clamp a grade into the supported range
pub fn clamp_grade(grade: u8) -> u8 {
    grade.clamp(MIN_GRADE, MAX_GRADE)
}

/// Capability flags for a grade
pub fn features(grade: u8) -> FeatureFlags {
    let grade = clamp_grade(grade);
    FeatureFlags {
        xp: grade >= 3,
        badges: grade >= 3,
        daily_streaks: grade >= 3,
        simple_unlocks: grade >= 3,
        challenges: grade >= 4,
        avatar_customization: grade >= 4,
        accuracy_challenge: grade >= 5,
        leaderboard: grade >= 6,
        advanced_stats: grade >= 6,
        prestige: grade >= 6,
        combo_multiplier: grade >= 6,
        streak_shield: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_grades_have_no_progression() {
        for grade in 1..=2 {
            let flags = features(grade);
            assert!(!flags.xp && !flags.badges && !flags.daily_streaks && !flags.challenges);
            assert!(!flags.combo_multiplier);
            assert!(flags.streak_shield);
        }
    }

    #[test]
    fn test_tiers() {
        let g3 = features(3);
        assert!(g3.xp && g3.badges && g3.daily_streaks && g3.simple_unlocks);
        assert!(!g3.challenges);

        let g4 = features(4);
        assert!(g4.challenges && g4.avatar_customization);
        assert!(!g4.accuracy_challenge);

        assert!(features(5).accuracy_challenge);
        assert!(!features(5).prestige);

        let g6 = features(6);
        assert!(g6.leaderboard && g6.advanced_stats && g6.prestige && g6.combo_multiplier);
    }

    #[test]
    fn test_out_of_range_grades_clamp() {
        assert_eq!(features(0), features(1));
        assert_eq!(features(12), features(8));
        assert_eq!(clamp_grade(200), MAX_GRADE);
    }

    #[test]
    fn test_monotonic_in_grade() {
        for grade in 1..8 {
            let lower = features(grade);
            let higher = features(grade + 1);
            assert!(!lower.xp || higher.xp);
            assert!(!lower.challenges || higher.challenges);
            assert!(!lower.combo_multiplier || higher.combo_multiplier);
        }
    }
}
