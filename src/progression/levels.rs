//! XP and Level system
//!
//! Converts exercise results into XP and resolves level-ups immediately.
//! The threshold for level `n` is `floor(100 * 1.2^(n-1))`; XP carries over
//! into the next level.

use tracing::info;

use super::models::{ExerciseResults, PlayerProfile};

/// Theme every player starts with
pub const DEFAULT_THEME: &str = "default";
/// Avatar every player starts with
pub const DEFAULT_AVATAR: &str = "owl";

/// Themes unlocked when reaching a level
pub static THEME_UNLOCKS: &[(u32, &str)] = &[(5, "ocean"), (10, "space"), (15, "jungle")];

/// Avatars unlocked when reaching a level
pub static AVATAR_UNLOCKS: &[(u32, &str)] = &[(3, "fox"), (7, "dragon"), (12, "robot")];

/// Highest reachable level; XP past it is capped below the threshold
pub const MAX_LEVEL: u32 = 100;

const BASE_THRESHOLD: f64 = 100.0;
const THRESHOLD_GROWTH: f64 = 1.2;

/// XP rewards for exercise results
pub struct XpRewards;

impl XpRewards {
    /// XP per correct answer
    pub const PER_CORRECT: u32 = 10;

    /// Accuracy tiers, highest first: (minimum percent, bonus)
    pub const ACCURACY_TIERS: [(f64, u32); 3] = [(90.0, 50), (75.0, 30), (60.0, 15)];

    /// Bonus when averaging under `SPEED_LIMIT_SECS` per question
    pub const SPEED_BONUS: u32 = 20;
    pub const SPEED_LIMIT_SECS: f64 = 30.0;

    /// In-exercise streak bonuses; both can apply
    pub const STREAK_5_BONUS: u32 = 25;
    pub const STREAK_10_BONUS: u32 = 50;

    pub const PERFECT_BONUS: u32 = 100;

    /// Accuracy bonus for a percentage
    pub fn accuracy_bonus(percent: f64) -> u32 {
        Self::ACCURACY_TIERS
            .iter()
            .find(|(min, _)| percent >= *min)
            .map(|(_, bonus)| *bonus)
            .unwrap_or(0)
    }
}

/// XP needed to advance from `level` to `level + 1`
pub fn xp_threshold(level: u32) -> u32 {
    let exponent = level.saturating_sub(1).min(i32::MAX as u32) as i32;
    (BASE_THRESHOLD * THRESHOLD_GROWTH.powi(exponent)).floor() as u32
}

/// XP earned for one exercise
pub fn calculate_xp(results: &ExerciseResults) -> u32 {
    let mut xp = XpRewards::PER_CORRECT.saturating_mul(results.correct_count);

    xp += XpRewards::accuracy_bonus(results.accuracy_percent());

    if let Some(secs) = results.seconds_per_question()
        && secs < XpRewards::SPEED_LIMIT_SECS
    {
        xp += XpRewards::SPEED_BONUS;
    }

    if results.max_streak >= 5 {
        xp += XpRewards::STREAK_5_BONUS;
    }
    if results.max_streak >= 10 {
        xp += XpRewards::STREAK_10_BONUS;
    }

    if results.perfect_score {
        xp += XpRewards::PERFECT_BONUS;
    }

    xp
}

/// Add XP to a profile, resolving every level-up it triggers.
///
/// Returns true if at least one level was gained.
pub fn add_xp(profile: &mut PlayerProfile, amount: u32) -> bool {
    profile.xp = profile.xp.saturating_add(amount);
    profile.lifetime_xp = profile.lifetime_xp.saturating_add(u64::from(amount));

    let mut leveled_up = false;
    while profile.xp >= profile.xp_to_next_level {
        if profile.level >= MAX_LEVEL {
            profile.xp = profile.xp_to_next_level.saturating_sub(1);
            break;
        }
        profile.xp -= profile.xp_to_next_level;
        profile.level += 1;
        profile.xp_to_next_level = xp_threshold(profile.level);
        leveled_up = true;

        info!("Level up: {} reached level {}", profile.player_name, profile.level);
        apply_level_unlocks(profile);
    }

    leveled_up
}

/// Add any theme/avatar tied to the profile's current level
fn apply_level_unlocks(profile: &mut PlayerProfile) {
    for (level, theme) in THEME_UNLOCKS {
        if *level == profile.level && profile.unlocked_themes.insert(theme.to_string()) {
            info!("Unlocked theme '{}'", theme);
        }
    }
    for (level, avatar) in AVATAR_UNLOCKS {
        if *level == profile.level && profile.unlocked_avatars.insert(avatar.to_string()) {
            info!("Unlocked avatar '{}'", avatar);
        }
    }
}
