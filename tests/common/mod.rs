//! Shared fixtures for progression and session integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use quiz_rewards::progression::ExerciseResults;
use quiz_rewards::storage::{KeyValueStore, MemoryStore, StorageError};
use quiz_rewards::FixedClock;

/// Clock fixed at noon on the given day
pub fn clock_on(year: i32, month: u32, day: u32) -> Arc<FixedClock> {
    let day = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
    Arc::new(FixedClock::on_day(day))
}

/// Builder for exercise results with neutral defaults
#[derive(Debug, Clone)]
pub struct ResultsBuilder {
    results: ExerciseResults,
}

impl ResultsBuilder {
    pub fn new(correct: u32, total: u32) -> Self {
        Self {
            results: ExerciseResults {
                exercise_id: "exercise".to_string(),
                category: "addition".to_string(),
                grade: 4,
                correct_count: correct,
                total_count: total,
                time_spent_seconds: 60 * total,
                max_streak: 0,
                hints_used: 0,
                perfect_score: total > 0 && correct == total,
            },
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.results.category = category.to_string();
        self
    }

    pub fn seconds(mut self, seconds: u32) -> Self {
        self.results.time_spent_seconds = seconds;
        self
    }

    pub fn max_streak(mut self, max_streak: u32) -> Self {
        self.results.max_streak = max_streak;
        self
    }

    pub fn build(self) -> ExerciseResults {
        self.results
    }
}

/// One wrong answer in one minute: earns no XP and touches each
/// challenge kind by the smallest possible step
pub fn zero_xp_exercise() -> ExerciseResults {
    ResultsBuilder::new(0, 1).seconds(60).build()
}

/// Store that passes its probe but can be told to fail every later write
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                needed: value.len(),
                limit: 0,
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}
