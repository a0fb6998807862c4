//! Placement controller: the command queue, the single in-progress
//! object, and the commit/cancel/undo state machine.
//!
//! The controller is the only writer of [`UndoHistory`], [`ScoreLedger`]
//! commits, and the active-placement slot, so session state has a
//! single writer. Invalid operations are
//! rejected as documented no-ops; the [`CommandLog`] records every
//! outcome so drivers and tests can observe silent rejections.
//!
//! Undo is not a separate rollback mechanism: the popped object re-enters
//! `Placing` and becomes the in-progress object, flowing through exactly
//! the same commit path as a fresh selection.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyRules;
use crate::config::PlacementConfig;
use crate::objects::{BuildState, ObjectType, PlacedObject, Position, ScoreTriple};
use crate::proximity::ProximitySet;
use crate::scoring::ScoreLedger;
use crate::sets::SimulationSet;
use crate::undo::UndoHistory;

// =============================================================================
// Commands
// =============================================================================

/// Everything a driver (HUD, script, agent) can ask the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlacementCommand {
    /// Spawn an instance of `object_type` at the origin and start placing it.
    Select { object_type: ObjectType },
    /// Move/rotate the in-progress object.
    Move { x: f32, y: f32, z: f32, yaw: f32 },
    /// Settle the in-progress object. Requires it to be valid.
    Commit,
    /// Discard the in-progress object without touching history.
    Cancel,
    /// Revoke the most recent commit; the object re-enters placing.
    Undo,
    /// Move to the next goal, if the gate allows it.
    AdvanceGoal,
    /// Hard level reset.
    Banish,
}

/// FIFO queue of pending commands, drained once per tick.
#[derive(Resource, Debug, Default)]
pub struct CommandQueue {
    pending: Vec<PlacementCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, command: PlacementCommand) {
        self.pending.push(command);
    }

    pub fn drain(&mut self) -> Vec<PlacementCommand> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Why a command was silently ignored. These are expected conditions the
/// caller is meant to avoid via the observable guards (`valid`,
/// `can_advance`, history length), not errors requiring recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectedTransition {
    /// `Select` while another object is already being placed.
    SelectWhilePlacing,
    /// `Move` with nothing selected.
    MoveWithoutActive,
    /// `Commit` with nothing selected.
    CommitWithoutActive,
    /// `Commit` on an ungrounded or colliding object.
    CommitInvalid,
    /// `Cancel` with nothing selected.
    CancelWithoutActive,
    /// `Undo` with an empty history window.
    UndoEmptyHistory,
    /// `AdvanceGoal` while the gate is closed.
    AdvanceBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    Applied,
    Rejected(RejectedTransition),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// Ring of recent command outcomes for drivers and tests.
#[derive(Resource, Debug, Default)]
pub struct CommandLog {
    entries: Vec<(PlacementCommand, CommandOutcome)>,
}

impl CommandLog {
    const MAX_ENTRIES: usize = 256;

    pub fn push(&mut self, command: PlacementCommand, outcome: CommandOutcome) {
        if self.entries.len() >= Self::MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push((command, outcome));
    }

    pub fn last(&self) -> Option<&(PlacementCommand, CommandOutcome)> {
        self.entries.last()
    }

    pub fn rejections(&self) -> impl Iterator<Item = &(PlacementCommand, CommandOutcome)> {
        self.entries
            .iter()
            .filter(|(_, outcome)| !outcome.is_applied())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Controller state and notifications
// =============================================================================

/// The single object currently being placed. `None` means idle. Exactly
/// one `Placing` object exists at a time; this slot enforces it.
///
/// The slot carries the object type alongside the entity because a spawn
/// is deferred through `Commands`: until the flush at the end of the
/// tick, the entity is invisible to queries, and a discard in that gap
/// must still know which base score entered the potential ledger.
#[derive(Resource, Debug, Default)]
pub struct ActivePlacement(pub Option<ActiveObject>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveObject {
    pub entity: Entity,
    pub object_type: ObjectType,
}

impl ActivePlacement {
    pub fn entity(&self) -> Option<Entity> {
        self.0.map(|a| a.entity)
    }
}

/// A placement was committed this tick.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlacementCommitted {
    pub entity: Entity,
    pub object_type: ObjectType,
}

/// A commit was revoked this tick; the object is placing again.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlacementUndone {
    pub entity: Entity,
    pub object_type: ObjectType,
}

/// Forwarded `AdvanceGoal` request, validated by the goal engine.
#[derive(Event, Debug, Clone, Copy)]
pub struct AdvanceGoalRequested;

/// Hard level reset request ("banishment").
#[derive(Event, Debug, Clone, Copy)]
pub struct BanishRequested;

// =============================================================================
// Executor
// =============================================================================

type ObjectQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut PlacedObject,
        &'static mut Position,
        &'static mut ProximitySet,
    ),
>;

/// Drains the command queue and applies each command in order.
///
/// Geometry runs once per tick, before this system. A `Commit` batched
/// behind a `Select` or `Move` would otherwise read validity flags and a
/// neighbor contribution computed for the pre-move position (or for no
/// position at all, the spawn still being deferred), so such commands are
/// held and re-queued: they execute next tick, after the geometry scan
/// has caught up. A `Move` batched behind its own `Select` is held for
/// the same reason.
#[allow(clippy::too_many_arguments)]
pub fn execute_commands(
    mut commands: Commands,
    mut queue: ResMut<CommandQueue>,
    mut log: ResMut<CommandLog>,
    mut active: ResMut<ActivePlacement>,
    mut history: ResMut<UndoHistory>,
    mut ledger: ResMut<ScoreLedger>,
    config: Res<PlacementConfig>,
    rules: Res<AdjacencyRules>,
    mut committed_events: EventWriter<PlacementCommitted>,
    mut undone_events: EventWriter<PlacementUndone>,
    mut advance_events: EventWriter<AdvanceGoalRequested>,
    mut banish_events: EventWriter<BanishRequested>,
    mut objects: ObjectQuery<'_, '_>,
) {
    let batch = queue.drain();
    // True once this batch spawned the active object / moved it, meaning
    // the geometry results in the world predate its current state.
    let mut spawn_pending = false;
    let mut geometry_stale = false;

    let mut index = 0;
    while index < batch.len() {
        let command = batch[index];
        let hold = match command {
            PlacementCommand::Move { .. } => spawn_pending,
            PlacementCommand::Commit => spawn_pending || geometry_stale,
            _ => false,
        };
        if hold {
            for &rest in &batch[index..] {
                queue.push(rest);
            }
            break;
        }
        index += 1;

        let outcome = match command {
            PlacementCommand::Select { object_type } => {
                let outcome = select(&mut commands, &mut active, &mut ledger, object_type);
                if outcome.is_applied() {
                    spawn_pending = true;
                    geometry_stale = true;
                }
                outcome
            }
            PlacementCommand::Move { x, y, z, yaw } => {
                let outcome = move_active(&active, &mut objects, x, y, z, yaw);
                if outcome.is_applied() {
                    geometry_stale = true;
                }
                outcome
            }
            PlacementCommand::Commit => commit(
                &mut active,
                &mut history,
                &mut ledger,
                &config,
                &mut committed_events,
                &mut objects,
            ),
            PlacementCommand::Cancel => {
                cancel(&mut commands, &mut active, &mut ledger, &mut objects)
            }
            PlacementCommand::Undo => undo(
                &mut commands,
                &mut active,
                &mut history,
                &mut ledger,
                &rules,
                &mut undone_events,
                &mut objects,
            ),
            PlacementCommand::AdvanceGoal => {
                // Validated against the gate by the goal engine, which
                // logs AdvanceBlocked itself when refused.
                advance_events.send(AdvanceGoalRequested);
                continue;
            }
            PlacementCommand::Banish => {
                banish_events.send(BanishRequested);
                CommandOutcome::Applied
            }
        };
        log.push(command, outcome);
    }
}

fn select(
    commands: &mut Commands,
    active: &mut ActivePlacement,
    ledger: &mut ScoreLedger,
    object_type: ObjectType,
) -> CommandOutcome {
    if active.0.is_some() {
        return CommandOutcome::Rejected(RejectedTransition::SelectWhilePlacing);
    }
    // The isolated base score enters the potential ledger immediately;
    // adjacency deltas follow once the geometry scan reports neighbors.
    let base = object_type.base_score();
    ledger.apply_potential(base);
    let entity = commands
        .spawn((
            PlacedObject::placing(object_type),
            Position::at(Vec3::ZERO),
            ProximitySet::seeded(base),
        ))
        .id();
    active.0 = Some(ActiveObject {
        entity,
        object_type,
    });
    CommandOutcome::Applied
}

fn move_active(
    active: &ActivePlacement,
    objects: &mut ObjectQuery<'_, '_>,
    x: f32,
    y: f32,
    z: f32,
    yaw: f32,
) -> CommandOutcome {
    let Some(slot) = active.0 else {
        return CommandOutcome::Rejected(RejectedTransition::MoveWithoutActive);
    };
    let Ok((_, _, mut pos, _)) = objects.get_mut(slot.entity) else {
        return CommandOutcome::Rejected(RejectedTransition::MoveWithoutActive);
    };
    pos.translation = Vec3::new(x, y, z);
    pos.yaw = yaw;
    CommandOutcome::Applied
}

fn commit(
    active: &mut ActivePlacement,
    history: &mut UndoHistory,
    ledger: &mut ScoreLedger,
    config: &PlacementConfig,
    committed_events: &mut EventWriter<PlacementCommitted>,
    objects: &mut ObjectQuery<'_, '_>,
) -> CommandOutcome {
    let Some(slot) = active.0 else {
        return CommandOutcome::Rejected(RejectedTransition::CommitWithoutActive);
    };
    let Ok((_, mut obj, _, tracker)) = objects.get_mut(slot.entity) else {
        return CommandOutcome::Rejected(RejectedTransition::CommitWithoutActive);
    };
    if !obj.valid() {
        return CommandOutcome::Rejected(RejectedTransition::CommitInvalid);
    }

    // Freeze the contribution as it stands right now; proximity tracking
    // stops publishing for this object from here on.
    let contribution = tracker.contribution();
    obj.state = BuildState::Placed;
    obj.frozen = contribution;
    ledger.commit(contribution);

    if let Some(evicted) = history.push(slot.entity, config.undo_capacity) {
        info!(
            "undo window overflow: {:?} is now a permanent placement",
            evicted
        );
    }
    committed_events.send(PlacementCommitted {
        entity: slot.entity,
        object_type: obj.object_type,
    });
    active.0 = None;
    CommandOutcome::Applied
}

fn cancel(
    commands: &mut Commands,
    active: &mut ActivePlacement,
    ledger: &mut ScoreLedger,
    objects: &mut ObjectQuery<'_, '_>,
) -> CommandOutcome {
    let Some(slot) = active.0 else {
        return CommandOutcome::Rejected(RejectedTransition::CancelWithoutActive);
    };
    discard_active(commands, ledger, objects, slot);
    active.0 = None;
    CommandOutcome::Applied
}

#[allow(clippy::too_many_arguments)]
fn undo(
    commands: &mut Commands,
    active: &mut ActivePlacement,
    history: &mut UndoHistory,
    ledger: &mut ScoreLedger,
    rules: &AdjacencyRules,
    undone_events: &mut EventWriter<PlacementUndone>,
    objects: &mut ObjectQuery<'_, '_>,
) -> CommandOutcome {
    if history.is_empty() {
        return CommandOutcome::Rejected(RejectedTransition::UndoEmptyHistory);
    }
    // Whatever is under the cursor is discarded first; the revived object
    // takes its place.
    if let Some(current) = active.0.take() {
        discard_active(commands, ledger, objects, current);
    }

    let entity = history
        .pop_front()
        .unwrap_or_else(|| unreachable!("history checked non-empty above"));

    let types: Vec<(Entity, ObjectType)> = objects
        .iter()
        .map(|(e, obj, _, _)| (e, obj.object_type))
        .collect();

    let Ok((_, mut obj, _, mut tracker)) = objects.get_mut(entity) else {
        // A popped entry always refers to a live, settled object.
        debug_assert!(false, "undo popped a despawned entity {entity:?}");
        return CommandOutcome::Rejected(RejectedTransition::UndoEmptyHistory);
    };

    ledger.revoke(obj.frozen);
    obj.frozen = ScoreTriple::ZERO;
    obj.state = BuildState::Placing;

    // Re-enter the fresh-placement path: rebuild the contribution from
    // the neighbor set as it stands today, not as it was at commit time.
    tracker.reset_contribution();
    let delta = tracker.recompute(obj.object_type, rules, |e| {
        types.iter().find(|(te, _)| *te == e).map(|(_, ty)| *ty)
    });
    ledger.apply_potential(delta);

    undone_events.send(PlacementUndone {
        entity,
        object_type: obj.object_type,
    });
    active.0 = Some(ActiveObject {
        entity,
        object_type: obj.object_type,
    });
    CommandOutcome::Applied
}

/// Despawn an in-progress object: revert its potential contribution and
/// drop the neighbor edge from every counterpart tracker (destruction of
/// either side removes the edge from both).
fn discard_active(
    commands: &mut Commands,
    ledger: &mut ScoreLedger,
    objects: &mut ObjectQuery<'_, '_>,
    slot: ActiveObject,
) {
    match objects.get_mut(slot.entity) {
        Ok((_, _, _, tracker)) => ledger.apply_potential(-tracker.contribution()),
        // The spawn from this batch has not flushed yet. The tracker still
        // holds only its seeded base score, which is exactly what entered
        // the potential ledger at selection.
        Err(_) => ledger.apply_potential(-slot.object_type.base_score()),
    }
    for (other, _, _, mut tracker) in objects.iter_mut() {
        if other != slot.entity {
            tracker.remove_neighbor(slot.entity);
        }
    }
    commands.entity(slot.entity).despawn();
}

// =============================================================================
// Plugin
// =============================================================================

pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CommandQueue>()
            .init_resource::<CommandLog>()
            .init_resource::<ActivePlacement>()
            .init_resource::<UndoHistory>()
            .init_resource::<PlacementConfig>()
            .add_event::<PlacementCommitted>()
            .add_event::<PlacementUndone>()
            .add_event::<AdvanceGoalRequested>()
            .add_event::<BanishRequested>()
            .add_systems(
                FixedUpdate,
                execute_commands.in_set(SimulationSet::Placement),
            );
    }
}
