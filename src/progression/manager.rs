//! Progression store - aggregate root for persistent progression
//!
//! Owns the profile, achievements, daily streak, challenges and stats, loads
//! them once at construction and writes them back after every mutation.
//! Storage problems never surface to the caller: an unusable store puts the
//! whole engine into disabled mode, unreadable values fall back to defaults
//! and failed writes are logged while in-memory state stays authoritative.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::challenges::ChallengeSet;
use super::checker::{self, AchievementProgress, CheckContext};
use super::definitions::Achievement;
use super::export::{EXPORT_VERSION, ExportData, ExportEnvelope, ProgressionError};
use super::levels::{MAX_LEVEL, add_xp, calculate_xp, xp_threshold};
use super::models::{
    AchievementState, CompletionResult, ExerciseResults, PlayerProfile, PlayerSummary,
    ProgressSnapshot,
};
use super::stats::StatsState;
use super::streaks::{DailyStreakState, StreakUpdate};
use crate::clock::Clock;
use crate::features::{FeatureFlags, clamp_grade, features};
use crate::storage::{self, KeyValueStore};

pub const PROFILE_KEY: &str = "progression.profile";
pub const ACHIEVEMENTS_KEY: &str = "progression.achievements";
pub const DAILY_STREAK_KEY: &str = "progression.daily_streak";
pub const CHALLENGES_KEY: &str = "progression.challenges";
pub const STATS_KEY: &str = "progression.stats";

pub struct ProgressionStore {
    /// `None` when the store failed its probe
    store: Option<Arc<dyn KeyValueStore>>,
    clock: Arc<dyn Clock>,
    profile: PlayerProfile,
    achievements: AchievementState,
    streak: DailyStreakState,
    challenges: ChallengeSet,
    stats: StatsState,
    /// Unlocked while loading; reported with the next completion
    pending_achievements: Vec<&'static Achievement>,
}

impl ProgressionStore {
    /// Load progression state from `store`.
    ///
    /// `player_name` and `grade` are only used when no profile is stored yet.
    /// If the store fails its probe the engine runs disabled for its whole
    /// lifetime.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        player_name: &str,
        grade: u8,
    ) -> Self {
        if let Err(e) = storage::probe(store.as_ref()) {
            warn!("Progress storage unavailable, progression disabled: {}", e);
            return Self::disabled(clock, player_name, grade);
        }

        let now = clock.now();
        let grade = clamp_grade(grade);
        let profile = load_or_default(store.as_ref(), PROFILE_KEY, || {
            PlayerProfile::new(player_name, grade, now)
        });
        let achievements = load_or_default(store.as_ref(), ACHIEVEMENTS_KEY, Default::default);
        let streak = load_or_default(store.as_ref(), DAILY_STREAK_KEY, Default::default);
        let challenges = load_or_default(store.as_ref(), CHALLENGES_KEY, Default::default);
        let stats = load_or_default(store.as_ref(), STATS_KEY, Default::default);

        let mut engine = Self {
            store: Some(store),
            clock,
            profile,
            achievements,
            streak,
            challenges,
            stats,
            pending_achievements: Vec::new(),
        };

        let flags = engine.features();
        if flags.daily_streaks {
            engine.check_in_streak();
        }
        if flags.challenges {
            engine.challenges.ensure_current(engine.clock.today(), &flags);
        }
        if flags.badges {
            engine.pending_achievements = engine.evaluate_achievements();
        }
        engine.save_all();
        engine
    }

    /// Engine that records nothing and reports `enabled: false`
    pub fn disabled(clock: Arc<dyn Clock>, player_name: &str, grade: u8) -> Self {
        let profile = PlayerProfile::new(player_name, clamp_grade(grade), clock.now());
        Self {
            store: None,
            clock,
            profile,
            achievements: AchievementState::default(),
            streak: DailyStreakState::default(),
            challenges: ChallengeSet::default(),
            stats: StatsState::default(),
            pending_achievements: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Feature flags for the player's current grade
    pub fn features(&self) -> FeatureFlags {
        features(self.profile.grade)
    }

    // ========================================
    // EXERCISE COMPLETION
    // ========================================

    /// Record a finished exercise and apply every reward it earns
    pub fn complete_exercise(&mut self, results: &ExerciseResults) -> CompletionResult {
        if !self.is_enabled() {
            return CompletionResult::disabled();
        }

        let now = self.clock.now();
        let today = self.clock.today();
        let flags = self.features();

        // A session crossing midnight counts the new day
        if flags.daily_streaks {
            self.check_in_streak();
        }

        self.profile.record_exercise(results, now);
        self.stats.record(results, &self.clock.today_key());

        let mut xp_earned = 0;
        let mut leveled_up = false;
        if flags.xp {
            let xp = calculate_xp(results);
            leveled_up |= add_xp(&mut self.profile, xp);
            xp_earned += xp;
        }

        // A new day counted at load time may already have unlocked streak achievements
        let mut new_achievements = std::mem::take(&mut self.pending_achievements);
        let mut completed_challenges = Vec::new();
        if flags.challenges {
            self.challenges.ensure_current(today, &flags);
            completed_challenges = self
                .challenges
                .update(results, self.streak.current_streak, now);

            for challenge in &completed_challenges {
                leveled_up |= add_xp(&mut self.profile, challenge.reward.xp);
                xp_earned += challenge.reward.xp;

                if let Some(badge) = &challenge.reward.badge
                    && let Some(achievement) =
                        checker::unlock_badge(&mut self.achievements, badge, now)
                {
                    new_achievements.push(achievement);
                }
            }
        }

        if flags.badges {
            new_achievements.extend(self.evaluate_achievements());
        }

        self.save_all();

        debug!(
            "Exercise {} recorded: +{} XP, level {}",
            results.exercise_id, xp_earned, self.profile.level
        );

        CompletionResult {
            enabled: true,
            xp_earned,
            leveled_up,
            new_level: leveled_up.then_some(self.profile.level),
            completed_challenges,
            new_achievements,
            total_xp: self.profile.lifetime_xp,
            current_level: self.profile.level,
            daily_streak: self.streak.current_streak,
        }
    }

    fn check_in_streak(&mut self) {
        let today = self.clock.today_key();
        let yesterday = self.clock.yesterday_key();
        match self.streak.check_in(&today, &yesterday) {
            StreakUpdate::AlreadyCounted => {}
            StreakUpdate::Extended(days) => info!("Daily streak extended to {} days", days),
            StreakUpdate::Started(days) => debug!("Daily streak started at {} day(s)", days),
        }
    }

    fn evaluate_achievements(&mut self) -> Vec<&'static Achievement> {
        let ctx = CheckContext {
            profile: &self.profile,
            streak: &self.streak,
            stats: &self.stats,
        };
        checker::evaluate(&mut self.achievements, &ctx, self.clock.now())
    }

    // ========================================
    // READ ACCESS
    // ========================================

    /// Snapshot of all persistent state, or `enabled: false`
    pub fn get_player_summary(&self) -> PlayerSummary {
        if !self.is_enabled() {
            return PlayerSummary {
                enabled: false,
                snapshot: None,
            };
        }

        PlayerSummary {
            enabled: true,
            snapshot: Some(ProgressSnapshot {
                profile: self.profile.clone(),
                streak: self.streak.clone(),
                achievements: self.achievements.clone(),
                challenges: self.challenges.clone(),
                stats: self.stats.clone(),
                features: self.features(),
            }),
        }
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn streak(&self) -> &DailyStreakState {
        &self.streak
    }

    pub fn achievements(&self) -> &AchievementState {
        &self.achievements
    }

    pub fn challenges(&self) -> &ChallengeSet {
        &self.challenges
    }

    pub fn stats(&self) -> &StatsState {
        &self.stats
    }

    /// Progress towards every achievement
    pub fn achievement_progress(&self) -> Vec<AchievementProgress> {
        let ctx = CheckContext {
            profile: &self.profile,
            streak: &self.streak,
            stats: &self.stats,
        };
        checker::progress(&self.achievements, &ctx)
    }

    // ========================================
    // PROFILE MAINTENANCE
    // ========================================

    /// Switch to an unlocked theme; false if locked or disabled
    pub fn select_theme(&mut self, theme: &str) -> bool {
        if !self.is_enabled() || !self.profile.unlocked_themes.contains(theme) {
            return false;
        }
        self.profile.current_theme = theme.to_string();
        self.persist(PROFILE_KEY, &self.profile);
        true
    }

    /// Switch to an unlocked avatar; needs avatar customization for the grade
    pub fn select_avatar(&mut self, avatar: &str) -> bool {
        if !self.is_enabled()
            || !self.features().avatar_customization
            || !self.profile.unlocked_avatars.contains(avatar)
        {
            return false;
        }
        self.profile.current_avatar = avatar.to_string();
        self.persist(PROFILE_KEY, &self.profile);
        true
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.profile.player_name = name.to_string();
        if self.is_enabled() {
            self.persist(PROFILE_KEY, &self.profile);
        }
    }

    /// Change the grade; feature gating follows from the next call on
    pub fn set_grade(&mut self, grade: u8) {
        self.profile.grade = clamp_grade(grade);
        if !self.is_enabled() {
            return;
        }

        let flags = self.features();
        if flags.challenges {
            // Sets generated while challenges were off are empty; build them now
            if self.challenges.daily.is_empty() {
                self.challenges.generated_date = None;
            }
            if self.challenges.weekly.is_empty() {
                self.challenges.week_number = None;
            }
            self.challenges.ensure_current(self.clock.today(), &flags);
        }
        self.save_all();
    }

    /// Wipe all progress, keeping the player's name and grade
    pub fn reset_progress(&mut self) {
        let name = self.profile.player_name.clone();
        let grade = self.profile.grade;

        self.profile = PlayerProfile::new(&name, grade, self.clock.now());
        self.achievements = AchievementState::default();
        self.streak = DailyStreakState::default();
        self.challenges = ChallengeSet::default();
        self.stats = StatsState::default();
        self.pending_achievements.clear();

        if !self.is_enabled() {
            return;
        }
        let flags = self.features();
        if flags.challenges {
            self.challenges.ensure_current(self.clock.today(), &flags);
        }
        info!("Progress reset for {}", name);
        self.save_all();
    }

    // ========================================
    // BACKUP / RESTORE
    // ========================================

    pub fn export_data(&self) -> Result<ExportEnvelope, ProgressionError> {
        if !self.is_enabled() {
            return Err(ProgressionError::Disabled);
        }
        Ok(ExportEnvelope::new(
            ExportData {
                profile: self.profile.clone(),
                achievements: self.achievements.clone(),
                daily_streak: self.streak.clone(),
                challenges: self.challenges.clone(),
                stats: self.stats.clone(),
            },
            self.clock.now(),
        ))
    }

    pub fn export_json(&self) -> Result<String, ProgressionError> {
        self.export_data()?.to_json()
    }

    /// Replace all state with a backup; state is untouched on error
    pub fn import_data(&mut self, envelope: ExportEnvelope) -> Result<(), ProgressionError> {
        if !self.is_enabled() {
            return Err(ProgressionError::Disabled);
        }
        if envelope.version != EXPORT_VERSION {
            return Err(ProgressionError::UnsupportedVersion {
                found: envelope.version,
                expected: EXPORT_VERSION,
            });
        }

        if envelope.data.profile.level > MAX_LEVEL {
            return Err(ProgressionError::InvalidProfile(format!(
                "level {} is above the maximum of {}",
                envelope.data.profile.level, MAX_LEVEL
            )));
        }

        let ExportData {
            mut profile,
            achievements,
            daily_streak,
            challenges,
            stats,
        } = envelope.data;

        // Hand-edited backups may carry a stale threshold or pending level-ups
        profile.grade = clamp_grade(profile.grade);
        profile.level = profile.level.max(1);
        profile.xp_to_next_level = xp_threshold(profile.level);
        add_xp(&mut profile, 0);

        self.profile = profile;
        self.achievements = achievements;
        self.streak = daily_streak;
        self.challenges = challenges;
        self.stats = stats;
        self.pending_achievements.clear();

        info!(
            "Imported progress for {} (level {})",
            self.profile.player_name, self.profile.level
        );
        self.save_all();
        Ok(())
    }

    pub fn import_json(&mut self, json: &str) -> Result<(), ProgressionError> {
        let envelope = ExportEnvelope::from_json(json)?;
        self.import_data(envelope)
    }

    // ========================================
    // PERSISTENCE
    // ========================================

    fn save_all(&self) {
        self.persist(PROFILE_KEY, &self.profile);
        self.persist(ACHIEVEMENTS_KEY, &self.achievements);
        self.persist(DAILY_STREAK_KEY, &self.streak);
        self.persist(CHALLENGES_KEY, &self.challenges);
        self.persist(STATS_KEY, &self.stats);
    }

    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = storage::write_json(store.as_ref(), key, value) {
            warn!("Failed to save {}: {}", key, e);
        }
    }
}

/// Read `key`, treating absent and unreadable values alike
fn load_or_default<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    default: impl FnOnce() -> T,
) -> T {
    match storage::read_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!("No stored {}, starting fresh", key);
            default()
        }
        Err(e) => {
            debug!("Stored {} unreadable ({}), starting fresh", key, e);
            default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::on_day(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()))
    }

    fn results(correct: u32, total: u32) -> ExerciseResults {
        ExerciseResults {
            exercise_id: "ex".to_string(),
            category: "addition".to_string(),
            grade: 4,
            correct_count: correct,
            total_count: total,
            time_spent_seconds: 600,
            max_streak: 2,
            hints_used: 0,
            perfect_score: false,
        }
    }

    #[test]
    fn test_fresh_engine_counts_today() {
        let store = Arc::new(MemoryStore::new());
        let engine = ProgressionStore::new(store.clone(), clock(), "Ada", 4);
        assert!(engine.is_enabled());
        assert_eq!(engine.streak().current_streak, 1);
        assert_eq!(engine.challenges().daily.len(), 3);
        // Everything written back
        assert!(store.get(PROFILE_KEY).unwrap().is_some());
        assert!(store.get(STATS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_unavailable_store_disables_engine() {
        let mut engine =
            ProgressionStore::new(Arc::new(MemoryStore::unavailable()), clock(), "Ada", 4);
        assert!(!engine.is_enabled());

        let result = engine.complete_exercise(&results(5, 5));
        assert!(!result.enabled);
        assert_eq!(result.xp_earned, 0);
        assert!(!engine.get_player_summary().enabled);
        assert!(matches!(engine.export_data(), Err(ProgressionError::Disabled)));
        assert!(!engine.select_theme("default"));
    }

    #[test]
    fn test_low_grade_only_aggregates_stats() {
        let mut engine = ProgressionStore::new(Arc::new(MemoryStore::new()), clock(), "Bo", 2);
        let result = engine.complete_exercise(&results(9, 10));
        assert!(result.enabled);
        assert_eq!(result.xp_earned, 0);
        assert!(result.new_achievements.is_empty());
        assert_eq!(engine.stats().category("addition").total, 10);
        assert_eq!(engine.profile().total_exercises, 1);
        assert_eq!(engine.streak().current_streak, 0);
    }

    #[test]
    fn test_select_cosmetics() {
        let mut engine = ProgressionStore::new(Arc::new(MemoryStore::new()), clock(), "Cy", 3);
        assert!(!engine.select_theme("space"));
        assert!(engine.select_theme("default"));

        engine.profile.unlocked_avatars.insert("fox".to_string());
        // Avatar customization starts at grade 4
        assert!(!engine.select_avatar("fox"));
        engine.set_grade(4);
        assert!(engine.select_avatar("fox"));
        assert_eq!(engine.profile().current_avatar, "fox");
    }

    #[test]
    fn test_set_grade_builds_challenges() {
        let mut engine = ProgressionStore::new(Arc::new(MemoryStore::new()), clock(), "Di", 3);
        assert!(engine.challenges().daily.is_empty());
        engine.set_grade(5);
        assert_eq!(engine.challenges().daily.len(), 4);
        assert_eq!(engine.challenges().weekly.len(), 2);
    }

    #[test]
    fn test_reset_keeps_identity() {
        let mut engine = ProgressionStore::new(Arc::new(MemoryStore::new()), clock(), "Ed", 5);
        engine.complete_exercise(&results(10, 10));
        assert!(engine.profile().lifetime_xp > 0);

        engine.reset_progress();
        assert_eq!(engine.profile().player_name, "Ed");
        assert_eq!(engine.profile().grade, 5);
        assert_eq!(engine.profile().lifetime_xp, 0);
        assert_eq!(engine.achievements().count(), 0);
        assert_eq!(engine.stats(), &StatsState::default());
    }
}
