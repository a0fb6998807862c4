//! Minimal session snapshot: the committed placement list, the committed
//! totals, and the current goal index.
//!
//! This is the rehydration contract for persistence. The undo window is
//! deliberately absent: a restored session starts with a fresh, empty
//! window, so snapshot objects are permanent and their frozen
//! contributions never need to be replayed individually.

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::goals::{GoalProgress, GoalWorkingSet, GOALS};
use crate::objects::{BuildState, ObjectType, PlacedObject, Position, ScoreTriple};
use crate::placement::ActivePlacement;
use crate::proximity::ProximitySet;
use crate::scoring::ScoreLedger;
use crate::undo::UndoHistory;

/// One settled object, as persisted.
#[derive(Debug, Clone, Copy, PartialEq, Encode, Decode)]
pub struct PlacedRecord {
    pub object_type: ObjectType,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
}

/// The minimal persistent state of a session.
#[derive(Debug, Clone, PartialEq, Default, Encode, Decode)]
pub struct SessionSnapshot {
    pub placed: Vec<PlacedRecord>,
    pub committed: ScoreTriple,
    pub goal_index: u32,
}

/// Capture the current session. Only `Placed` objects are recorded; an
/// in-progress object is cursor state and does not persist.
pub fn capture(world: &mut World) -> SessionSnapshot {
    let mut placed = Vec::new();
    let mut query = world.query::<(&PlacedObject, &Position)>();
    for (obj, pos) in query.iter(world) {
        if obj.state != BuildState::Placed {
            continue;
        }
        placed.push(PlacedRecord {
            object_type: obj.object_type,
            x: pos.translation.x,
            y: pos.translation.y,
            z: pos.translation.z,
            yaw: pos.yaw,
        });
    }
    // Deterministic output regardless of ECS iteration order.
    placed.sort_by(|a, b| {
        (a.object_type, a.x.to_bits(), a.z.to_bits())
            .cmp(&(b.object_type, b.x.to_bits(), b.z.to_bits()))
    });

    let ledger = world.resource::<ScoreLedger>();
    let progress = world.resource::<GoalProgress>();
    SessionSnapshot {
        placed,
        committed: ledger.committed,
        goal_index: progress.goal_index as u32,
    }
}

/// Rehydrate a session from a snapshot, replacing whatever is live.
///
/// Spawned objects come back `Placed` with a zero frozen contribution:
/// with an empty undo window they can never be individually revoked, so
/// the committed totals carry the whole score. Goal working counts are
/// reset to the template at the restored index; the save extension map
/// overwrites them afterwards when present.
pub fn restore(world: &mut World, snapshot: &SessionSnapshot) {
    let existing: Vec<Entity> = world
        .query_filtered::<Entity, With<PlacedObject>>()
        .iter(world)
        .collect();
    for entity in existing {
        world.despawn(entity);
    }

    for record in &snapshot.placed {
        let mut obj = PlacedObject::placing(record.object_type);
        obj.state = BuildState::Placed;
        obj.grounded = true;
        world.spawn((
            obj,
            Position {
                translation: Vec3::new(record.x, record.y, record.z),
                yaw: record.yaw,
            },
            ProximitySet::default(),
        ));
    }

    world.resource_mut::<ActivePlacement>().0 = None;
    world.resource_mut::<UndoHistory>().clear();

    let mut ledger = world.resource_mut::<ScoreLedger>();
    ledger.reset();
    ledger.apply_committed(snapshot.committed);

    let goal_index = snapshot.goal_index as usize;
    let mut progress = world.resource_mut::<GoalProgress>();
    progress.goal_index = goal_index;
    progress.working = match GOALS.get(goal_index) {
        Some(template) => GoalWorkingSet::from_template(template),
        None => GoalWorkingSet::default(),
    };
    progress.can_advance = false;
}
