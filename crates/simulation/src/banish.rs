//! Banishment: the hard level reset invoked at a level/session boundary.
//!
//! Clears the ledger, the undo window, the goal progress, and every
//! placed object. Idempotent: a second banishment of an already-empty
//! level changes nothing.

use bevy::prelude::*;

use crate::objects::PlacedObject;
use crate::placement::{
    ActivePlacement, BanishRequested, PlacementCommitted, PlacementUndone,
};
use crate::scoring::ScoreLedger;
use crate::sets::SimulationSet;
use crate::undo::UndoHistory;

#[allow(clippy::too_many_arguments)]
fn apply_banishment(
    mut commands: Commands,
    mut requests: EventReader<BanishRequested>,
    mut active: ResMut<ActivePlacement>,
    mut ledger: ResMut<ScoreLedger>,
    mut history: ResMut<UndoHistory>,
    mut progress: ResMut<crate::goals::GoalProgress>,
    mut committed_events: ResMut<Events<PlacementCommitted>>,
    mut undone_events: ResMut<Events<PlacementUndone>>,
    objects: Query<Entity, With<PlacedObject>>,
) {
    if requests.read().next().is_none() {
        return;
    }

    for entity in &objects {
        commands.entity(entity).despawn();
    }
    active.0 = None;
    ledger.reset();
    history.clear();
    *progress = crate::goals::GoalProgress::default();

    // Placement notifications from earlier in this tick refer to a world
    // that no longer exists; drop them before the goal engine reads them.
    committed_events.clear();
    undone_events.clear();

    info!("level banished: ledger, history, and goal progress reset");
}

pub struct BanishPlugin;

impl Plugin for BanishPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            apply_banishment
                .in_set(SimulationSet::Placement)
                .after(crate::placement::execute_commands),
        );
    }
}
