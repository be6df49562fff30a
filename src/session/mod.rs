//! In-session reward ladder
//!
//! Scoped to a single quiz attempt. Tracks the running streak, milestone
//! bonuses, the one-time shield, the combo multiplier (grade 6+), stickers
//! and the star rating. Nothing here is ever deducted.
//!
//! # Usage
//!
//! ```ignore
//! let mut session = SessionRewardEngine::new(grade, Arc::new(SystemClock), None);
//! let feedback = session.process_answer(true);
//! println!("{}", feedback.message);
//! let summary = session.get_session_summary();
//! ```

mod engine;
mod models;

pub use engine::{
    MILESTONES, SESSION_KEY, SHIELD_AT_CORRECT, SHIELD_MIN_STREAK, SessionRewardEngine,
};
pub use models::{
    Feedback, MultiplierState, SessionState, SessionSummary, ShieldState, StarLevel, Sticker,
};
