//! The bounded undo window: revival through the normal placing path,
//! most-recent-first ordering, and eviction permanence.

use crate::config::PlacementConfig;
use crate::objects::{BuildState, ObjectType, PlacedObject, ScoreTriple};
use crate::placement::{CommandOutcome, RejectedTransition};
use crate::test_harness::TestLevel;

#[test]
fn undo_revives_the_most_recent_commit() {
    let mut level = TestLevel::new();
    level.place(ObjectType::ProtoAlpha, 0.0, 0.0);
    level.place(ObjectType::ProtoBeta, 10.0, 0.0);
    assert_eq!(level.ledger().committed, ScoreTriple::new(-5, -2, -5));
    assert_eq!(level.history_len(), 2);

    level.undo();

    // The beta's frozen share leaves the committed side and its live
    // contribution reappears on the potential side.
    assert_eq!(level.ledger().committed, ScoreTriple::new(0, 3, 0));
    assert_eq!(level.ledger().potential, ScoreTriple::new(-5, -5, -5));
    assert_eq!(level.history_len(), 1);

    let beta = level.active().expect("the beta is placing again");
    let obj = level.world_mut().get::<PlacedObject>(beta).unwrap();
    assert_eq!(obj.object_type, ObjectType::ProtoBeta);
    assert_eq!(obj.state, BuildState::Placing);
    assert_eq!(obj.frozen, ScoreTriple::ZERO);

    // Recommitting goes through the ordinary path and restores the totals.
    level.commit();
    assert_eq!(level.ledger().committed, ScoreTriple::new(-5, -2, -5));
    assert_eq!(level.ledger().potential, ScoreTriple::ZERO);
    assert_eq!(level.history_len(), 2);
}

#[test]
fn undo_with_empty_history_is_rejected() {
    let mut level = TestLevel::new();
    level.undo();
    assert_eq!(
        level.log().last().unwrap().1,
        CommandOutcome::Rejected(RejectedTransition::UndoEmptyHistory)
    );
}

#[test]
fn undo_discards_the_current_cursor_object() {
    let mut level = TestLevel::new();
    level.place(ObjectType::ProtoAlpha, 0.0, 0.0);
    level.select(ObjectType::Cabin).move_to(100.0, 100.0);
    assert_eq!(level.ledger().potential, ObjectType::Cabin.base_score());

    level.undo();

    // The hovering cabin is gone; the alpha is back under the cursor.
    assert_eq!(level.object_count(), 1);
    assert_eq!(level.ledger().committed, ScoreTriple::ZERO);
    assert_eq!(level.ledger().potential, ScoreTriple::new(0, 3, 0));
    let active = level.active().expect("revived object takes the cursor");
    assert_eq!(
        level
            .world_mut()
            .get::<PlacedObject>(active)
            .unwrap()
            .object_type,
        ObjectType::ProtoAlpha
    );
}

#[test]
fn overflow_evicts_the_oldest_placement_permanently() {
    let mut level = TestLevel::new();
    level
        .world_mut()
        .resource_mut::<PlacementConfig>()
        .undo_capacity = 2;

    // Far enough apart that no adjacency rules fire.
    level.place(ObjectType::Cabin, 0.0, 0.0);
    level.place(ObjectType::Cabin, 60.0, 0.0);
    level.place(ObjectType::Cabin, 120.0, 0.0);
    assert_eq!(level.history_len(), 2, "the first commit was evicted");

    level.undo();
    level.undo();
    assert_eq!(level.history_len(), 0);

    // Two undos peeled back the two windowed commits; the evicted cabin
    // stays settled forever.
    assert_eq!(level.ledger().committed, ObjectType::Cabin.base_score());
    level.undo();
    assert_eq!(
        level.log().last().unwrap().1,
        CommandOutcome::Rejected(RejectedTransition::UndoEmptyHistory)
    );
}

#[test]
fn revived_object_rescores_against_todays_neighbors() {
    let mut level = TestLevel::new();
    level.place(ObjectType::Cabin, 0.0, 0.0);
    level.place(ObjectType::Cabin, 10.0, 0.0);
    // Second cabin froze base (2,0,-1) plus the (1,0,0) clustering rule.
    assert_eq!(level.ledger().committed, ScoreTriple::new(5, 0, -2));

    level.undo();
    assert_eq!(level.ledger().committed, ScoreTriple::new(2, 0, -1));
    assert_eq!(level.ledger().potential, ScoreTriple::new(3, 0, -1));

    // Moved out of range before recommitting: only the base survives.
    level.move_to(100.0, 0.0).commit();
    assert_eq!(level.ledger().committed, ScoreTriple::new(4, 0, -2));
}
