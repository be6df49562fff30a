//! Aggregate answer statistics
//!
//! Purely additive counters by category, grade and day. Accuracy is derived
//! on read and never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::models::ExerciseResults;

/// Correct/total counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    /// Accuracy (0.0 - 1.0), `None` when nothing was answered
    pub fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(f64::from(self.correct) / f64::from(self.total))
        }
    }

    fn add(&mut self, correct: u32, total: u32) {
        self.correct = self.correct.saturating_add(correct);
        self.total = self.total.saturating_add(total);
    }
}

/// Per-day counter, which also counts exercises
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTally {
    pub correct: u32,
    pub total: u32,
    pub exercises: u32,
}

impl DailyTally {
    pub fn accuracy(&self) -> Option<f64> {
        Tally {
            correct: self.correct,
            total: self.total,
        }
        .accuracy()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsState {
    #[serde(default)]
    pub by_category: BTreeMap<String, Tally>,
    #[serde(default)]
    pub by_grade: BTreeMap<u8, Tally>,
    /// Keyed by day key
    #[serde(default)]
    pub by_date: BTreeMap<String, DailyTally>,
    #[serde(default)]
    pub perfect_scores: u32,
    #[serde(default)]
    pub total_hints_used: u32,
}

impl StatsState {
    /// Fold one exercise into the counters
    pub fn record(&mut self, results: &ExerciseResults, today: &str) {
        self.by_category
            .entry(results.category.clone())
            .or_default()
            .add(results.correct_count, results.total_count);

        self.by_grade
            .entry(results.grade)
            .or_default()
            .add(results.correct_count, results.total_count);

        let day = self.by_date.entry(today.to_string()).or_default();
        day.correct = day.correct.saturating_add(results.correct_count);
        day.total = day.total.saturating_add(results.total_count);
        day.exercises = day.exercises.saturating_add(1);

        if results.perfect_score {
            self.perfect_scores = self.perfect_scores.saturating_add(1);
        }
        self.total_hints_used = self.total_hints_used.saturating_add(results.hints_used);
    }

    pub fn category(&self, category: &str) -> Tally {
        self.by_category.get(category).copied().unwrap_or_default()
    }

    pub fn category_accuracy(&self, category: &str) -> Option<f64> {
        self.by_category.get(category).and_then(Tally::accuracy)
    }

    pub fn grade_accuracy(&self, grade: u8) -> Option<f64> {
        self.by_grade.get(&grade).and_then(Tally::accuracy)
    }

    pub fn date_accuracy(&self, day: &str) -> Option<f64> {
        self.by_date.get(day).and_then(DailyTally::accuracy)
    }

    /// Accuracy across every category
    pub fn overall_accuracy(&self) -> Option<f64> {
        let total = self
            .by_category
            .values()
            .fold(Tally::default(), |mut acc, t| {
                acc.add(t.correct, t.total);
                acc
            });
        total.accuracy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(category: &str, grade: u8, correct: u32, total: u32) -> ExerciseResults {
        ExerciseResults {
            exercise_id: "ex".to_string(),
            category: category.to_string(),
            grade,
            correct_count: correct,
            total_count: total,
            time_spent_seconds: 60,
            max_streak: 0,
            hints_used: 2,
            perfect_score: correct == total,
        }
    }

    #[test]
    fn test_record_accumulates() {
        let mut stats = StatsState::default();
        stats.record(&results("addition", 4, 8, 10), "2024-01-01");
        stats.record(&results("addition", 4, 10, 10), "2024-01-01");
        stats.record(&results("spelling", 5, 3, 4), "2024-01-02");

        assert_eq!(stats.category("addition"), Tally { correct: 18, total: 20 });
        assert_eq!(stats.by_grade[&5], Tally { correct: 3, total: 4 });
        assert_eq!(stats.by_date["2024-01-01"].exercises, 2);
        assert_eq!(stats.perfect_scores, 1);
        assert_eq!(stats.total_hints_used, 6);
        assert_eq!(stats.by_date.len(), 2);
    }

    #[test]
    fn test_accuracy_accessors() {
        let mut stats = StatsState::default();
        assert_eq!(stats.category_accuracy("addition"), None);
        assert_eq!(stats.overall_accuracy(), None);

        stats.record(&results("addition", 4, 9, 10), "2024-01-01");
        stats.record(&results("reading", 4, 1, 10), "2024-01-01");

        assert_eq!(stats.category_accuracy("addition"), Some(0.9));
        assert_eq!(stats.grade_accuracy(4), Some(0.5));
        assert_eq!(stats.date_accuracy("2024-01-01"), Some(0.5));
        assert_eq!(stats.date_accuracy("2024-01-02"), None);
        assert_eq!(stats.overall_accuracy(), Some(0.5));
    }

    #[test]
    fn test_grade_keys_survive_json() {
        let mut stats = StatsState::default();
        stats.record(&results("addition", 7, 1, 2), "2024-01-01");
        let json = serde_json::to_string(&stats).unwrap();
        let back: StatsState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
