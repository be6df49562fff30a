//! Session reward data model

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cosmetic sticker earned during a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sticker {
    Streak3,
    Streak5,
    Streak10,
    /// First five answers all correct
    PerfectStart,
    /// Shield used to save a streak
    ShieldHero,
}

impl Sticker {
    /// Sticker tied to a streak milestone
    pub fn for_milestone(streak: u32) -> Option<Self> {
        match streak {
            3 => Some(Self::Streak3),
            5 => Some(Self::Streak5),
            10 => Some(Self::Streak10),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Streak3 => "Triple Play",
            Self::Streak5 => "High Five",
            Self::Streak10 => "Perfect Ten",
            Self::PerfectStart => "Perfect Start",
            Self::ShieldHero => "Shield Hero",
        }
    }
}

/// Coarse accuracy rating for the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarLevel {
    #[default]
    Empty,
    Bronze,
    Silver,
    Gold,
}

impl StarLevel {
    /// Answers needed before a rating is given
    pub const MIN_ANSWERS: u32 = 5;

    /// Rating for `correct` out of `total` answers
    pub fn for_accuracy(correct: u32, total: u32) -> Self {
        if total == 0 {
            return Self::Empty;
        }
        // Integer percent comparisons keep the thresholds exact
        let pct = u64::from(correct) * 100;
        let total = u64::from(total);
        if pct >= 90 * total {
            Self::Gold
        } else if pct >= 75 * total {
            Self::Silver
        } else if pct >= 50 * total {
            Self::Bronze
        } else {
            Self::Empty
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldState {
    pub available: bool,
    pub used: bool,
    pub earned_at: Option<DateTime<Utc>>,
}

impl ShieldState {
    /// A session earns at most one shield
    pub fn can_earn(&self) -> bool {
        !self.available && !self.used && self.earned_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierState {
    pub active: bool,
    pub value: u32,
}

impl Default for MultiplierState {
    fn default() -> Self {
        Self {
            active: false,
            value: 1,
        }
    }
}

impl MultiplierState {
    /// Factor applied to milestone bonuses right now
    pub fn factor(&self) -> u32 {
        if self.active { self.value } else { 1 }
    }
}

/// Everything tracked for one quiz attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,

    /// One point per correct answer
    pub score: u32,
    /// Milestone bonuses
    pub bonus_points: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub correct_answers: u32,
    pub total_answers: u32,

    pub milestones_reached: BTreeSet<u32>,
    pub shield: ShieldState,
    pub multiplier: MultiplierState,
    pub last_streak_before_miss: u32,
    pub stickers_unlocked: BTreeSet<Sticker>,
    pub star_level: StarLevel,
}

impl SessionState {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at,
            score: 0,
            bonus_points: 0,
            current_streak: 0,
            best_streak: 0,
            correct_answers: 0,
            total_answers: 0,
            milestones_reached: BTreeSet::new(),
            shield: ShieldState::default(),
            multiplier: MultiplierState::default(),
            last_streak_before_miss: 0,
            stickers_unlocked: BTreeSet::new(),
            star_level: StarLevel::Empty,
        }
    }

    pub fn total_score(&self) -> u32 {
        self.score + self.bonus_points
    }

    /// Session accuracy (0.0 - 1.0), `None` before the first answer
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_answers == 0 {
            None
        } else {
            Some(f64::from(self.correct_answers) / f64::from(self.total_answers))
        }
    }
}

/// Returned for every answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    /// False when no usable store backs the session snapshot
    pub enabled: bool,
    pub is_correct: bool,
    /// Total score after this answer, bonuses included
    pub score: u32,
    /// Bonus awarded for this answer
    pub bonus: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    /// Milestone reached with this answer
    pub milestone: Option<u32>,
    pub milestones_reached: BTreeSet<u32>,
    pub multiplier_active: bool,
    pub shield_unlocked: bool,
    pub shield_available: bool,
    pub streak_protected: bool,
    pub near_miss: bool,
    pub new_stickers: Vec<Sticker>,
    pub star_level: StarLevel,
    /// Encouragement to show; always positive
    pub message: String,
}

/// Final tally of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// False when no usable store backs the session snapshot
    pub enabled: bool,
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub total_answers: u32,
    pub correct_answers: u32,
    pub accuracy: Option<f64>,
    pub best_streak: u32,
    pub score: u32,
    pub bonus_points: u32,
    pub total_score: u32,
    pub milestones_reached: BTreeSet<u32>,
    pub stickers: Vec<Sticker>,
    pub star_level: StarLevel,
    pub shield_used: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_thresholds() {
        assert_eq!(StarLevel::for_accuracy(5, 5), StarLevel::Gold);
        assert_eq!(StarLevel::for_accuracy(9, 10), StarLevel::Gold);
        assert_eq!(StarLevel::for_accuracy(3, 4), StarLevel::Silver);
        assert_eq!(StarLevel::for_accuracy(1, 2), StarLevel::Bronze);
        assert_eq!(StarLevel::for_accuracy(2, 5), StarLevel::Empty);
        assert_eq!(StarLevel::for_accuracy(0, 0), StarLevel::Empty);
    }

    #[test]
    fn test_sticker_for_milestone() {
        assert_eq!(Sticker::for_milestone(5), Some(Sticker::Streak5));
        assert_eq!(Sticker::for_milestone(4), None);
    }

    #[test]
    fn test_multiplier_factor() {
        let mut m = MultiplierState::default();
        assert_eq!(m.factor(), 1);
        m.active = true;
        m.value = 2;
        assert_eq!(m.factor(), 2);
    }

    #[test]
    fn test_new_state_ids_differ() {
        let now = Utc::now();
        assert_ne!(SessionState::new(now).session_id, SessionState::new(now).session_id);
    }
}
