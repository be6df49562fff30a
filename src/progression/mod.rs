//! Persistent progression engine
//!
//! Turns finished exercises into XP, levels, cosmetic unlocks, daily and
//! weekly challenges and achievements. State lives in a
//! [`KeyValueStore`](crate::storage::KeyValueStore) and survives restarts.
//!
//! # Usage
//!
//! ```ignore
//! let store = Arc::new(SqliteStore::open(&path)?);
//! let mut progression = ProgressionStore::new(store, Arc::new(SystemClock), "Sam", 5);
//!
//! let result = progression.complete_exercise(&results);
//! if result.leveled_up {
//!     println!("Level {}!", result.current_level);
//! }
//! ```

pub mod challenges;
pub mod checker;
pub mod definitions;
mod export;
pub mod levels;
mod manager;
mod models;
pub mod stats;
pub mod streaks;

pub use challenges::{Challenge, ChallengeKind, ChallengePeriod, ChallengeReward, ChallengeSet};
pub use checker::{AchievementProgress, CheckContext, MIN_MASTERY_SAMPLES};
pub use definitions::{ACHIEVEMENTS, Achievement, AchievementCondition};
pub use export::{EXPORT_VERSION, ExportData, ExportEnvelope, ProgressionError};
pub use levels::{MAX_LEVEL, XpRewards, add_xp, calculate_xp, xp_threshold};
pub use manager::{
    ACHIEVEMENTS_KEY, CHALLENGES_KEY, DAILY_STREAK_KEY, PROFILE_KEY, ProgressionStore, STATS_KEY,
};
pub use models::{
    AchievementState, CompletionResult, ExerciseResults, PlayerProfile, PlayerSummary,
    ProgressSnapshot,
};
pub use stats::{DailyTally, StatsState, Tally};
pub use streaks::{DailyStreakState, StreakUpdate};
