//! Daily streak tracking
//!
//! Counts consecutive calendar days with at least one finished exercise.
//! Days are compared as `YYYY-MM-DD` keys supplied by the caller's clock.

use serde::{Deserialize, Serialize};

/// Persistent daily streak state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Day key of the last counted day
    pub last_active_date: Option<String>,
    pub total_days_active: u32,
    // Nothing sets or consumes these yet; check_in only honours streak_frozen
    #[serde(default)]
    pub streak_frozen: bool,
    #[serde(default)]
    pub freezes_available: u32,
}

/// What a check-in did to the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakUpdate {
    /// Today was already counted
    AlreadyCounted,
    /// Practiced yesterday too; carries the new length
    Extended(u32),
    /// First day or a gap; carries the new length
    Started(u32),
}

impl DailyStreakState {
    /// Count `today` as an active day.
    ///
    /// Calling this more than once on the same day is a no-op.
    pub fn check_in(&mut self, today: &str, yesterday: &str) -> StreakUpdate {
        match self.last_active_date.as_deref() {
            Some(last) if last == today => return StreakUpdate::AlreadyCounted,
            Some(last) if last == yesterday => {
                self.current_streak = self.current_streak.saturating_add(1);
                self.longest_streak = self.longest_streak.max(self.current_streak);
                self.total_days_active = self.total_days_active.saturating_add(1);
                self.last_active_date = Some(today.to_string());
                return StreakUpdate::Extended(self.current_streak);
            }
            _ => {}
        }

        if !self.streak_frozen {
            self.current_streak = 1;
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.total_days_active = self.total_days_active.saturating_add(1);
        self.last_active_date = Some(today.to_string());
        StreakUpdate::Started(self.current_streak)
    }
}
