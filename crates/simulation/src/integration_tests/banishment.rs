//! Banishment wipes the whole session back to the first goal.

use crate::goals::GoalProgress;
use crate::objects::{ObjectType, ScoreTriple};
use crate::test_harness::TestLevel;

#[test]
fn banish_clears_objects_ledger_history_and_goals() {
    let mut level = TestLevel::new();
    level.place(ObjectType::Cabin, 0.0, 0.0);
    level.place(ObjectType::WindTurbine, 60.0, 0.0);
    assert_ne!(level.ledger().committed, ScoreTriple::ZERO);
    assert_eq!(level.goals().remaining(ObjectType::Cabin), Some(1));

    level.banish();
    level.tick(1);

    assert_eq!(level.object_count(), 0);
    assert!(level.active().is_none());
    assert_eq!(level.ledger().committed, ScoreTriple::ZERO);
    assert_eq!(level.ledger().potential, ScoreTriple::ZERO);
    assert_eq!(level.history_len(), 0);
    assert_eq!(*level.goals(), GoalProgress::default());
}

#[test]
fn banish_discards_an_in_progress_object() {
    let mut level = TestLevel::new();
    level.select(ObjectType::House).move_to(80.0, 80.0);
    assert!(level.active().is_some());

    level.banish();
    level.tick(1);

    assert!(level.active().is_none());
    assert_eq!(level.object_count(), 0);
    assert_eq!(level.ledger().potential, ScoreTriple::ZERO);
}

#[test]
fn banish_is_idempotent() {
    let mut level = TestLevel::new();
    level.place(ObjectType::Cabin, 0.0, 0.0);

    level.banish();
    level.tick(1);
    let after_first = level.goals().clone();

    level.banish();
    level.tick(1);

    assert_eq!(level.object_count(), 0);
    assert_eq!(*level.goals(), after_first);
    assert_eq!(level.ledger().committed, ScoreTriple::ZERO);
}

#[test]
fn play_continues_normally_after_banishment() {
    let mut level = TestLevel::new();
    level.place(ObjectType::Cabin, 0.0, 0.0);
    level.banish();
    level.tick(1);

    level.place(ObjectType::Cabin, 0.0, 0.0);
    assert_eq!(level.object_count(), 1);
    assert_eq!(level.ledger().committed, ObjectType::Cabin.base_score());
    assert_eq!(level.goals().remaining(ObjectType::Cabin), Some(1));
    assert_eq!(level.history_len(), 1);
}
