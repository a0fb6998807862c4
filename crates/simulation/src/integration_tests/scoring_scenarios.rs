//! Ledger arithmetic end to end: potential tracking while the cursor
//! moves, freeze-at-commit, and the balancing-prototype walkthrough.

use crate::objects::{ObjectType, ScoreTriple};
use crate::placement::PlacementCommand;
use crate::test_harness::TestLevel;

/// ProtoAlpha base (0,3,0); ProtoBeta base (0,-5,-5) plus (-5,0,0) beside
/// an alpha. Committing both lands the totals at (-5,-2,-5).
#[test]
fn prototype_pair_walkthrough() {
    let mut level = TestLevel::new();

    level.place(ObjectType::ProtoAlpha, 0.0, 0.0);
    assert_eq!(level.ledger().committed, ScoreTriple::new(0, 3, 0));
    assert_eq!(level.ledger().potential, ScoreTriple::ZERO);

    // 10 units away: inside the 24-unit sensing radius, clear of footprints.
    level.select(ObjectType::ProtoBeta).move_to(10.0, 0.0);
    assert_eq!(level.ledger().potential, ScoreTriple::new(-5, -5, -5));
    assert_eq!(
        level.ledger().committed,
        ScoreTriple::new(0, 3, 0),
        "the settled alpha is untouched while the beta hovers"
    );

    level.commit();
    assert_eq!(level.ledger().committed, ScoreTriple::new(-5, -2, -5));
    assert_eq!(level.ledger().potential, ScoreTriple::ZERO);
}

#[test]
fn held_commit_scores_the_post_move_neighbors() {
    let mut level = TestLevel::new();
    level.place(ObjectType::ProtoAlpha, 0.0, 0.0);
    level.select(ObjectType::ProtoBeta).move_to(200.0, 200.0);

    // Move back beside the alpha and commit in one batch: the commit is
    // held a tick and settles with the alpha-adjacent contribution, not
    // the isolated one from (200, 200).
    level
        .push(PlacementCommand::Move {
            x: 10.0,
            y: 0.0,
            z: 0.0,
            yaw: 0.0,
        })
        .push(PlacementCommand::Commit)
        .tick(3);

    assert_eq!(level.ledger().committed, ScoreTriple::new(-5, -2, -5));
    assert_eq!(level.ledger().potential, ScoreTriple::ZERO);
}

#[test]
fn potential_follows_the_cursor_in_and_out_of_range() {
    let mut level = TestLevel::new();
    level.place(ObjectType::ProtoAlpha, 0.0, 0.0);

    level.select(ObjectType::ProtoBeta).move_to(10.0, 0.0);
    assert_eq!(level.ledger().potential, ScoreTriple::new(-5, -5, -5));

    // Far outside sensing range: only the base score remains.
    level.move_to(200.0, 200.0);
    assert_eq!(level.ledger().potential, ScoreTriple::new(0, -5, -5));

    // Back in range: the adjacency delta reappears.
    level.move_to(10.0, 0.0);
    assert_eq!(level.ledger().potential, ScoreTriple::new(-5, -5, -5));

    level.cancel();
    assert_eq!(level.ledger().potential, ScoreTriple::ZERO);
}

#[test]
fn committed_share_is_frozen_against_later_neighbors() {
    let mut level = TestLevel::new();
    level.place(ObjectType::ProtoAlpha, 0.0, 0.0);
    let alpha_share = level.ledger().committed;

    // (ProtoAlpha, ProtoBeta) carries a (0,1,0) rule, but the alpha
    // committed before the beta existed, so its share never moves.
    level.place(ObjectType::ProtoBeta, 10.0, 0.0);
    assert_eq!(
        level.ledger().committed,
        alpha_share + ScoreTriple::new(-5, -5, -5)
    );
}

#[test]
fn asymmetric_rule_scores_by_placement_order() {
    // Reverse order of the walkthrough: the beta settles first, then the
    // alpha hovers beside it and picks up its own (0,1,0) rule instead.
    let mut level = TestLevel::new();
    level.place(ObjectType::ProtoBeta, 0.0, 0.0);
    assert_eq!(level.ledger().committed, ScoreTriple::new(0, -5, -5));

    level.select(ObjectType::ProtoAlpha).move_to(10.0, 0.0);
    assert_eq!(
        level.ledger().potential,
        ScoreTriple::new(0, 3, 0) + ScoreTriple::new(0, 1, 0)
    );
}

#[test]
fn out_of_range_neighbors_never_score() {
    let mut level = TestLevel::new();
    level.place(ObjectType::ProtoAlpha, 0.0, 0.0);

    // 30 units is past the sensing radius.
    level.select(ObjectType::ProtoBeta).move_to(30.0, 0.0);
    assert_eq!(level.ledger().potential, ScoreTriple::new(0, -5, -5));
}

#[test]
fn unrelated_types_add_only_their_bases() {
    let mut level = TestLevel::new();
    // No rule in either direction between a wind turbine and a tavern.
    level.place(ObjectType::WindTurbine, 0.0, 0.0);
    level.place(ObjectType::Tavern, 15.0, 0.0);
    assert_eq!(
        level.ledger().committed,
        ObjectType::WindTurbine.base_score() + ObjectType::Tavern.base_score()
    );
}
