//! Quiz Rewards - progression and reward engine for a quiz platform
//!
//! Turns raw exercise results into experience points, levels, unlockable
//! cosmetics, daily/weekly challenges and achievements, and runs an
//! in-session streak ladder that only ever adds rewards.
//!
//! ## Engines
//!
//! 1. **[`ProgressionStore`]**: persistent, one call to
//!    [`complete_exercise`](ProgressionStore::complete_exercise) per finished
//!    exercise.
//!
//! 2. **[`SessionRewardEngine`]**: ephemeral, one call to
//!    [`process_answer`](SessionRewardEngine::process_answer) per answered
//!    question.
//!
//! Both read time through a [`Clock`] and persist through a
//! [`KeyValueStore`], and both keep working when storage is unavailable.

pub mod clock;
pub mod config;
pub mod features;
pub mod progression;
pub mod session;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use features::{FeatureFlags, features};
pub use progression::{CompletionResult, ExerciseResults, PlayerSummary, ProgressionStore};
pub use session::{Feedback, SessionRewardEngine, SessionSummary};
pub use storage::{KeyValueStore, StorageError};
