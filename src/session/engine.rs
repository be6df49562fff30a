//! Session reward engine
//!
//! Rewards only ever accumulate: a wrong answer can reset the running
//! streak and switch off the multiplier, but score, best streak, milestones
//! and stickers are never taken away.

use std::sync::Arc;

use tracing::{debug, warn};

use super::models::{Feedback, SessionState, SessionSummary, StarLevel, Sticker};
use crate::clock::Clock;
use crate::features::{FeatureFlags, clamp_grade, features};
use crate::storage::{self, KeyValueStore};

/// Key the best-effort session snapshot is written under
pub const SESSION_KEY: &str = "session.current";

/// Streak milestones and their base bonus
pub const MILESTONES: [(u32, u32); 3] = [(3, 2), (5, 3), (10, 5)];

/// Correct answers that earn the shield
pub const SHIELD_AT_CORRECT: u32 = 5;

/// Streak a shield is worth spending on
pub const SHIELD_MIN_STREAK: u32 = 3;

const MULTIPLIER_VALUE: u32 = 2;

/// Streak length that gets the "almost there" message on a miss
const NEAR_MISS_STREAK: u32 = 4;

fn milestone_bonus(streak: u32) -> Option<u32> {
    MILESTONES
        .iter()
        .find(|(at, _)| *at == streak)
        .map(|(_, bonus)| *bonus)
}

pub struct SessionRewardEngine {
    flags: FeatureFlags,
    clock: Arc<dyn Clock>,
    /// `None` when no store was given or it failed its probe
    store: Option<Arc<dyn KeyValueStore>>,
    state: SessionState,
}

impl SessionRewardEngine {
    /// Start a fresh session for `grade`.
    ///
    /// The optional store only receives snapshots; the session works the
    /// same without one.
    pub fn new(grade: u8, clock: Arc<dyn Clock>, store: Option<Arc<dyn KeyValueStore>>) -> Self {
        let store = store.and_then(|store| match storage::probe(store.as_ref()) {
            Ok(()) => Some(store),
            Err(e) => {
                warn!("Session storage unavailable, running in memory only: {}", e);
                None
            }
        });

        let state = SessionState::new(clock.now());
        debug!("Session {} started", state.session_id);
        Self {
            flags: features(clamp_grade(grade)),
            clock,
            store,
            state,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Score one answer
    pub fn process_answer(&mut self, is_correct: bool) -> Feedback {
        let feedback = if is_correct {
            self.on_correct()
        } else {
            self.on_incorrect()
        };
        self.save_snapshot();
        feedback
    }

    fn on_correct(&mut self) -> Feedback {
        let s = &mut self.state;
        s.total_answers += 1;
        s.correct_answers += 1;
        s.current_streak += 1;
        s.best_streak = s.best_streak.max(s.current_streak);
        s.score += 1;

        let mut new_stickers = Vec::new();
        let mut milestone = None;
        let mut bonus = 0;

        if let Some(base) = milestone_bonus(s.current_streak)
            && s.milestones_reached.insert(s.current_streak)
        {
            // The 3-streak bonus is paid before the multiplier switches on
            bonus = base * s.multiplier.factor();
            s.bonus_points += bonus;
            milestone = Some(s.current_streak);

            if let Some(sticker) = Sticker::for_milestone(s.current_streak)
                && s.stickers_unlocked.insert(sticker)
            {
                new_stickers.push(sticker);
            }

            if s.current_streak == 3 && self.flags.combo_multiplier && !s.multiplier.active {
                s.multiplier.active = true;
                s.multiplier.value = MULTIPLIER_VALUE;
            }
        }

        let mut shield_unlocked = false;
        if self.flags.streak_shield
            && s.correct_answers == SHIELD_AT_CORRECT
            && s.shield.can_earn()
        {
            s.shield.available = true;
            s.shield.earned_at = Some(self.clock.now());
            shield_unlocked = true;
        }

        if s.total_answers == StarLevel::MIN_ANSWERS
            && s.correct_answers == StarLevel::MIN_ANSWERS
            && s.stickers_unlocked.insert(Sticker::PerfectStart)
        {
            new_stickers.push(Sticker::PerfectStart);
        }

        Self::update_star_level(s);

        let message = if shield_unlocked {
            "You earned a shield! It will protect your streak once."
        } else {
            match milestone {
                Some(10) => "Ten in a row! You're a superstar!",
                Some(5) => "Five in a row! Amazing!",
                Some(_) => "Three in a row! Keep it up!",
                None => "Correct! Well done!",
            }
        };

        self.feedback(true, bonus, milestone, shield_unlocked, false, false, new_stickers, message)
    }

    fn on_incorrect(&mut self) -> Feedback {
        let s = &mut self.state;
        s.total_answers += 1;

        let mut new_stickers = Vec::new();
        let mut near_miss = false;
        let streak_protected =
            s.shield.available && !s.shield.used && s.current_streak >= SHIELD_MIN_STREAK;

        if streak_protected {
            s.shield.available = false;
            s.shield.used = true;
            if s.stickers_unlocked.insert(Sticker::ShieldHero) {
                new_stickers.push(Sticker::ShieldHero);
            }
        } else {
            s.last_streak_before_miss = s.current_streak;
            near_miss = s.current_streak == NEAR_MISS_STREAK;
            s.current_streak = 0;
            s.multiplier.active = false;
            s.multiplier.value = 1;
        }

        Self::update_star_level(s);

        let message = if streak_protected {
            "Your shield saved your streak! Keep going!"
        } else if near_miss {
            "So close! You almost had five in a row. Try again!"
        } else {
            "Nice try! Every question helps you learn."
        };

        self.feedback(
            false,
            0,
            None,
            false,
            streak_protected,
            near_miss,
            new_stickers,
            message,
        )
    }

    fn update_star_level(s: &mut SessionState) {
        if s.total_answers >= StarLevel::MIN_ANSWERS {
            s.star_level = StarLevel::for_accuracy(s.correct_answers, s.total_answers);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn feedback(
        &self,
        is_correct: bool,
        bonus: u32,
        milestone: Option<u32>,
        shield_unlocked: bool,
        streak_protected: bool,
        near_miss: bool,
        new_stickers: Vec<Sticker>,
        message: &str,
    ) -> Feedback {
        let s = &self.state;
        Feedback {
            enabled: self.is_enabled(),
            is_correct,
            score: s.total_score(),
            bonus,
            current_streak: s.current_streak,
            best_streak: s.best_streak,
            milestone,
            milestones_reached: s.milestones_reached.clone(),
            multiplier_active: s.multiplier.active,
            shield_unlocked,
            shield_available: s.shield.available,
            streak_protected,
            near_miss,
            new_stickers,
            star_level: s.star_level,
            message: message.to_string(),
        }
    }

    /// Final tally for the session so far
    pub fn get_session_summary(&self) -> SessionSummary {
        let s = &self.state;
        SessionSummary {
            enabled: self.is_enabled(),
            session_id: s.session_id,
            started_at: s.started_at,
            total_answers: s.total_answers,
            correct_answers: s.correct_answers,
            accuracy: s.accuracy(),
            best_streak: s.best_streak,
            score: s.score,
            bonus_points: s.bonus_points,
            total_score: s.total_score(),
            milestones_reached: s.milestones_reached.clone(),
            stickers: s.stickers_unlocked.iter().copied().collect(),
            star_level: s.star_level,
            shield_used: s.shield.used,
        }
    }

    /// Discard the current session and start a new one
    pub fn reset(&mut self) {
        self.state = SessionState::new(self.clock.now());
        debug!("Session {} started", self.state.session_id);
        self.save_snapshot();
    }

    fn save_snapshot(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = storage::write_json(store.as_ref(), SESSION_KEY, &self.state) {
            warn!("Failed to save {}: {}", SESSION_KEY, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn engine(grade: u8) -> SessionRewardEngine {
        let clock = Arc::new(FixedClock::on_day(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        SessionRewardEngine::new(grade, clock, None)
    }

    #[test]
    fn test_five_correct() {
        let mut e = engine(4);
        let feedback: Vec<_> = (0..5).map(|_| e.process_answer(true)).collect();

        assert_eq!(feedback[2].milestone, Some(3));
        assert_eq!(feedback[2].bonus, 2);
        assert_eq!(feedback[4].milestone, Some(5));
        assert_eq!(feedback[4].bonus, 3);
        assert_eq!(feedback[4].milestones_reached, BTreeSet::from([3, 5]));
        assert!(feedback[4].shield_unlocked);
        assert!(feedback[..4].iter().all(|f| !f.shield_unlocked));

        // Stars only from the fifth answer
        assert!(feedback[..4].iter().all(|f| f.star_level == StarLevel::Empty));
        assert_eq!(feedback[4].star_level, StarLevel::Gold);
        assert!(feedback[4].new_stickers.contains(&Sticker::PerfectStart));
        assert_eq!(feedback[4].score, 5 + 2 + 3);
    }

    #[test]
    fn test_shield_protects_streak() {
        let mut e = engine(4);
        e.state.current_streak = 4;
        e.state.shield.available = true;

        let f = e.process_answer(false);
        assert!(f.streak_protected);
        assert!(!f.near_miss);
        assert_eq!(f.current_streak, 4);
        assert!(!f.shield_available);
        assert!(f.new_stickers.contains(&Sticker::ShieldHero));

        // Shield is gone for the rest of the session
        let f = e.process_answer(false);
        assert!(!f.streak_protected);
        assert_eq!(f.current_streak, 0);
    }

    #[test]
    fn test_shield_needs_streak_of_three() {
        let mut e = engine(4);
        e.state.current_streak = 2;
        e.state.shield.available = true;

        let f = e.process_answer(false);
        assert!(!f.streak_protected);
        assert!(f.shield_available);
        assert_eq!(f.current_streak, 0);
    }

    #[test]
    fn test_near_miss_without_shield() {
        let mut e = engine(4);
        for _ in 0..4 {
            e.process_answer(true);
        }
        let f = e.process_answer(false);
        assert!(f.near_miss);
        assert!(!f.streak_protected);
        assert_eq!(f.current_streak, 0);
        assert_eq!(e.state().last_streak_before_miss, 4);
        // Nothing earned is taken away
        assert_eq!(f.best_streak, 4);
        assert_eq!(f.score, 4 + 2);
    }

    #[test]
    fn test_milestones_fire_once() {
        let mut e = engine(4);
        for _ in 0..3 {
            e.process_answer(true);
        }
        e.process_answer(false);
        let again: Vec<_> = (0..3).map(|_| e.process_answer(true)).collect();
        assert!(again.iter().all(|f| f.milestone.is_none() && f.bonus == 0));
        assert_eq!(e.state().bonus_points, 2);
    }

    #[test]
    fn test_multiplier_for_older_grades() {
        let mut e = engine(6);
        let feedback: Vec<_> = (0..10).map(|_| e.process_answer(true)).collect();
        assert_eq!(feedback[2].bonus, 2);
        assert!(feedback[2].multiplier_active);
        assert_eq!(feedback[4].bonus, 6);
        assert_eq!(feedback[9].bonus, 10);

        let f = e.process_answer(false);
        // Shield earned at five correct saves the streak and keeps the multiplier
        assert!(f.streak_protected);
        assert!(f.multiplier_active);

        let f = e.process_answer(false);
        assert!(!f.multiplier_active);
        assert_eq!(f.current_streak, 0);
    }

    #[test]
    fn test_no_multiplier_below_grade_six() {
        let mut e = engine(5);
        let feedback: Vec<_> = (0..10).map(|_| e.process_answer(true)).collect();
        assert!(feedback.iter().all(|f| !f.multiplier_active));
        assert_eq!(feedback[9].bonus, 5);
        assert_eq!(e.get_session_summary().total_score, 10 + 2 + 3 + 5);
    }

    #[test]
    fn test_messages_are_positive() {
        let mut e = engine(3);
        let answers = [true, false, true, true, true, true, false, false, true];
        for answer in answers {
            let f = e.process_answer(answer);
            let lower = f.message.to_lowercase();
            assert!(!f.message.is_empty());
            assert!(!lower.contains("wrong") && !lower.contains("lost") && !lower.contains("fail"));
        }
    }

    #[test]
    fn test_snapshot_written_and_reset() {
        let clock = Arc::new(FixedClock::on_day(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        let store = Arc::new(MemoryStore::new());
        let mut e = SessionRewardEngine::new(4, clock, Some(store.clone()));
        assert!(e.is_enabled());

        e.process_answer(true);
        let saved: SessionState = storage::read_json(&*store, SESSION_KEY)
            .unwrap()
            .unwrap();
        assert_eq!(saved.correct_answers, 1);

        let old_id = e.state().session_id;
        e.reset();
        assert_ne!(e.state().session_id, old_id);
        assert_eq!(e.state().total_answers, 0);
    }

    #[test]
    fn test_unavailable_store_still_scores() {
        let clock = Arc::new(FixedClock::on_day(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        let mut e = SessionRewardEngine::new(4, clock, Some(Arc::new(MemoryStore::unavailable())));
        assert!(!e.is_enabled());
        let f = e.process_answer(true);
        assert_eq!(f.score, 1);
        assert!(!f.enabled);
        assert!(!e.get_session_summary().enabled);
    }
}
