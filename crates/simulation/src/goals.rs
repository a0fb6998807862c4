//! Goal progression: an ordered deck of goals, a mutable working copy of
//! the current goal's counts, and the advance gate.
//!
//! The deck itself is immutable data. Each time a goal becomes current
//! the engine takes an owned working copy, decrements its counts as
//! placements commit, and increments them back on undo. Advancing clears
//! the undo window so no placement can be revoked across a goal boundary.

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::objects::ObjectType;
use crate::placement::{
    AdvanceGoalRequested, CommandLog, CommandOutcome, PlacementCommand, PlacementCommitted,
    PlacementUndone, RejectedTransition,
};
use crate::scoring::ScoreLedger;
use crate::sets::SimulationSet;
use crate::undo::UndoHistory;
use crate::Saveable;

// =============================================================================
// Goal deck (immutable template data)
// =============================================================================

/// One goal as authored: object counts plus a viability floor.
pub struct GoalTemplate {
    pub name: &'static str,
    /// Counts that gate advancement.
    pub required: &'static [(ObjectType, i32)],
    /// Bonus counts shown to the player but never gating.
    pub extra: &'static [(ObjectType, i32)],
    /// Committed viability floor for advancement.
    pub minimum_viability: i32,
}

/// The session's goal deck, in play order.
pub const GOALS: &[GoalTemplate] = &[
    GoalTemplate {
        name: "First Shelter",
        required: &[
            (ObjectType::Cabin, 2),
            (ObjectType::WindTurbine, 1),
            (ObjectType::Orchard, 1),
        ],
        extra: &[(ObjectType::Grove, 2)],
        minimum_viability: 5,
    },
    GoalTemplate {
        name: "Growing Hamlet",
        required: &[(ObjectType::House, 3), (ObjectType::Well, 1)],
        extra: &[(ObjectType::Park, 1)],
        minimum_viability: 15,
    },
    GoalTemplate {
        name: "Market Square",
        required: &[
            (ObjectType::Market, 1),
            (ObjectType::Bakery, 1),
            (ObjectType::House, 2),
        ],
        extra: &[(ObjectType::Tavern, 1)],
        minimum_viability: 25,
    },
    GoalTemplate {
        name: "Powered Up",
        required: &[(ObjectType::SolarArray, 2), (ObjectType::Workshop, 1)],
        extra: &[(ObjectType::Warehouse, 1)],
        minimum_viability: 35,
    },
    GoalTemplate {
        name: "Dense Quarters",
        required: &[(ObjectType::Tenement, 2), (ObjectType::Park, 2)],
        extra: &[(ObjectType::Manor, 1)],
        minimum_viability: 50,
    },
    GoalTemplate {
        name: "Thriving Haven",
        required: &[
            (ObjectType::Manor, 1),
            (ObjectType::Tavern, 1),
            (ObjectType::Grove, 2),
        ],
        extra: &[],
        minimum_viability: 70,
    },
];

// =============================================================================
// Working state
// =============================================================================

/// A live count for one object type. `remaining <= 0` means satisfied;
/// negative values record surplus placements that undo can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct GoalItem {
    pub object_type: ObjectType,
    pub remaining: i32,
}

/// Owned, mutable copy of the current goal, replaced wholesale on
/// advancement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct GoalWorkingSet {
    pub required: Vec<GoalItem>,
    pub extra: Vec<GoalItem>,
    pub minimum_viability: i32,
}

impl GoalWorkingSet {
    pub fn from_template(template: &GoalTemplate) -> Self {
        let items = |list: &[(ObjectType, i32)]| {
            list.iter()
                .map(|&(object_type, remaining)| GoalItem {
                    object_type,
                    remaining,
                })
                .collect()
        };
        Self {
            required: items(template.required),
            extra: items(template.extra),
            minimum_viability: template.minimum_viability,
        }
    }

    fn adjust(&mut self, object_type: ObjectType, delta: i32) {
        // Required takes precedence when a type appears in both lists.
        let slot = self
            .required
            .iter_mut()
            .chain(self.extra.iter_mut())
            .find(|item| item.object_type == object_type);
        if let Some(item) = slot {
            item.remaining += delta;
        }
    }

    fn required_satisfied(&self) -> bool {
        self.required.iter().all(|item| item.remaining <= 0)
    }
}

/// Tracks the active goal and whether the gate is open.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct GoalProgress {
    /// Index into [`GOALS`]; equal to `GOALS.len()` once the level is done.
    pub goal_index: usize,
    pub working: GoalWorkingSet,
    pub can_advance: bool,
}

impl Default for GoalProgress {
    fn default() -> Self {
        Self {
            goal_index: 0,
            working: GoalWorkingSet::from_template(&GOALS[0]),
            can_advance: false,
        }
    }
}

impl GoalProgress {
    pub fn current_goal(&self) -> Option<&GoalTemplate> {
        GOALS.get(self.goal_index)
    }

    /// True once every goal in the deck has been advanced past.
    pub fn level_complete(&self) -> bool {
        self.goal_index >= GOALS.len()
    }

    /// Live remaining count for a type, searching required then extra.
    pub fn remaining(&self, object_type: ObjectType) -> Option<i32> {
        self.working
            .required
            .iter()
            .chain(self.working.extra.iter())
            .find(|item| item.object_type == object_type)
            .map(|item| item.remaining)
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// The gate opened and a new goal became current.
#[derive(Event, Debug, Clone, Copy)]
pub struct GoalAdvanced {
    pub goal_index: usize,
    pub minimum_viability: i32,
}

/// The final goal was advanced past; an external level/scene collaborator
/// takes over from here.
#[derive(Event, Debug, Clone, Copy)]
pub struct LevelComplete;

// =============================================================================
// Systems
// =============================================================================

/// Consume commit/undo notifications and keep the working counts paired.
fn track_placements(
    mut committed: EventReader<PlacementCommitted>,
    mut undone: EventReader<PlacementUndone>,
    mut progress: ResMut<GoalProgress>,
) {
    if progress.level_complete() {
        committed.clear();
        undone.clear();
        return;
    }
    for event in committed.read() {
        progress.working.adjust(event.object_type, -1);
    }
    for event in undone.read() {
        progress.working.adjust(event.object_type, 1);
        // Commit and undo are strictly paired, so an increment can never
        // push a count above its authored template value.
        if let Some(template) = GOALS.get(progress.goal_index) {
            for item in progress.working.required.iter().chain(&progress.working.extra) {
                let authored = template
                    .required
                    .iter()
                    .chain(template.extra)
                    .find(|(ty, _)| *ty == item.object_type)
                    .map(|&(_, n)| n)
                    .unwrap_or(0);
                debug_assert!(
                    item.remaining <= authored,
                    "goal count for {:?} rose above its template value",
                    item.object_type
                );
            }
        }
    }
}

/// Recompute the gate after every commit/undo and score change.
fn evaluate_gate(ledger: Res<ScoreLedger>, mut progress: ResMut<GoalProgress>) {
    if progress.level_complete() {
        return;
    }
    let open = progress.working.required_satisfied()
        && ledger.committed.viability() >= progress.working.minimum_viability
        && ledger.committed.all_positive();
    if progress.can_advance != open {
        progress.can_advance = open;
    }
}

/// Apply driver advance requests, refusing them while the gate is closed.
fn handle_advance_requests(
    mut requests: EventReader<AdvanceGoalRequested>,
    mut progress: ResMut<GoalProgress>,
    mut history: ResMut<UndoHistory>,
    mut log: ResMut<CommandLog>,
    mut advanced: EventWriter<GoalAdvanced>,
    mut complete: EventWriter<LevelComplete>,
) {
    for _ in requests.read() {
        if !progress.can_advance || progress.level_complete() {
            log.push(
                PlacementCommand::AdvanceGoal,
                CommandOutcome::Rejected(RejectedTransition::AdvanceBlocked),
            );
            continue;
        }

        progress.goal_index += 1;
        // Goal boundary: nothing placed under the previous goal can be
        // revoked anymore.
        history.clear();

        if let Some(template) = GOALS.get(progress.goal_index) {
            progress.working = GoalWorkingSet::from_template(template);
            progress.can_advance = false;
            info!("goal advanced: now working toward \"{}\"", template.name);
            advanced.send(GoalAdvanced {
                goal_index: progress.goal_index,
                minimum_viability: template.minimum_viability,
            });
        } else {
            progress.working = GoalWorkingSet::default();
            progress.can_advance = false;
            info!("level complete: goal deck exhausted");
            complete.send(LevelComplete);
        }
        log.push(PlacementCommand::AdvanceGoal, CommandOutcome::Applied);
    }
}

// =============================================================================
// Persistence
// =============================================================================

#[derive(Encode, Decode, Default)]
struct GoalProgressSave {
    goal_index: u32,
    working: GoalWorkingSet,
    can_advance: bool,
}

impl Saveable for GoalProgress {
    const SAVE_KEY: &'static str = "goal_progress";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if *self == GoalProgress::default() {
            return None;
        }
        Some(bitcode::encode(&GoalProgressSave {
            goal_index: self.goal_index as u32,
            working: self.working.clone(),
            can_advance: self.can_advance,
        }))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        let save: GoalProgressSave = crate::decode_or_warn(Self::SAVE_KEY, bytes);
        Self {
            goal_index: save.goal_index as usize,
            working: save.working,
            can_advance: save.can_advance,
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct GoalsPlugin;

impl Plugin for GoalsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GoalProgress>()
            .add_event::<GoalAdvanced>()
            .add_event::<LevelComplete>()
            .add_systems(
                FixedUpdate,
                (track_placements, evaluate_gate, handle_advance_requests)
                    .chain()
                    .in_set(SimulationSet::Progress),
            );

        app.init_resource::<crate::SaveableRegistry>();
        let mut registry = app.world_mut().resource_mut::<crate::SaveableRegistry>();
        registry.register::<GoalProgress>();
    }
}
