//! Integration tests for the in-session reward ladder

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::clock_on;
use quiz_rewards::SessionRewardEngine;
use quiz_rewards::session::{SESSION_KEY, SessionState, StarLevel, Sticker};
use quiz_rewards::storage::{MemoryStore, read_json};

fn engine(grade: u8) -> SessionRewardEngine {
    SessionRewardEngine::new(grade, clock_on(2024, 3, 1), None)
}

#[test]
fn test_five_correct_answers() {
    let mut session = engine(4);
    let feedback: Vec<_> = (0..5).map(|_| session.process_answer(true)).collect();

    let bonuses: Vec<u32> = feedback.iter().map(|f| f.bonus).collect();
    assert_eq!(bonuses, vec![0, 0, 2, 0, 3]);
    assert_eq!(feedback[4].milestones_reached, BTreeSet::from([3, 5]));
    assert!(feedback[4].shield_unlocked);
    assert!(feedback[4].shield_available);

    assert!(feedback[..4].iter().all(|f| f.star_level == StarLevel::Empty));
    assert_eq!(feedback[4].star_level, StarLevel::Gold);
}

#[test]
fn test_shield_saves_streak_once() {
    let mut session = engine(4);
    for _ in 0..5 {
        session.process_answer(true);
    }

    let saved = session.process_answer(false);
    assert!(saved.streak_protected);
    assert_eq!(saved.current_streak, 5);
    assert!(!saved.shield_available);
    assert!(saved.new_stickers.contains(&Sticker::ShieldHero));

    let reset = session.process_answer(false);
    assert!(!reset.streak_protected);
    assert_eq!(reset.current_streak, 0);
    assert!(session.get_session_summary().shield_used);
}

#[test]
fn test_near_miss_at_four() {
    let mut session = engine(4);
    for _ in 0..4 {
        session.process_answer(true);
    }

    let miss = session.process_answer(false);
    assert!(miss.near_miss);
    assert!(!miss.streak_protected);
    assert_eq!(miss.current_streak, 0);

    // Rebuilding a streak does not re-fire the 3 milestone
    for _ in 0..3 {
        assert!(session.process_answer(true).milestone.is_none());
    }
}

#[test]
fn test_shield_is_earned_only_at_exactly_five_correct() {
    let mut session = engine(4);
    // Wrong answers in between still count correct answers towards the shield
    for answer in [true, true, false, true, true] {
        assert!(!session.process_answer(answer).shield_unlocked);
    }
    assert!(session.process_answer(true).shield_unlocked);
    for _ in 0..10 {
        assert!(!session.process_answer(true).shield_unlocked);
    }
}

#[test]
fn test_nothing_is_ever_taken_away() {
    let mut session = engine(6);
    let answers = [
        true, true, true, true, true, false, false, true, false, true, true, true, false,
    ];

    let mut last_score = 0;
    let mut last_best = 0;
    let mut stickers = BTreeSet::new();
    for answer in answers {
        let f = session.process_answer(answer);
        assert!(f.score >= last_score);
        assert!(f.best_streak >= last_best);
        last_score = f.score;
        last_best = f.best_streak;
        stickers.extend(f.new_stickers);
    }

    let summary = session.get_session_summary();
    assert_eq!(summary.total_answers, answers.len() as u32);
    assert_eq!(summary.correct_answers, 9);
    assert_eq!(summary.total_score, last_score);
    assert_eq!(summary.stickers.into_iter().collect::<BTreeSet<_>>(), stickers);
    // 9 of 13 correct is 69%
    assert_eq!(summary.star_level, StarLevel::Bronze);
}

#[test]
fn test_session_snapshot_is_best_effort() {
    let store = Arc::new(MemoryStore::new());
    let mut session = SessionRewardEngine::new(5, clock_on(2024, 3, 1), Some(store.clone()));
    assert!(session.process_answer(true).enabled);
    assert!(session.process_answer(false).enabled);

    let saved: SessionState = read_json(&*store, SESSION_KEY).unwrap().unwrap();
    assert_eq!(saved.total_answers, 2);
    assert_eq!(saved.session_id, session.get_session_summary().session_id);

    let mut offline = SessionRewardEngine::new(
        5,
        clock_on(2024, 3, 1),
        Some(Arc::new(MemoryStore::unavailable())),
    );
    let f = offline.process_answer(true);
    assert_eq!(f.score, 1);
    assert!(!f.enabled);
    assert!(!offline.get_session_summary().enabled);
}
