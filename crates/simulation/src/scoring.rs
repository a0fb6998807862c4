//! The score ledger: committed totals for settled objects, potential
//! totals for the object under the cursor.
//!
//! Commitment freezes a value. Once an object moves from the potential to
//! the committed side, later placements beside it never adjust its share;
//! only the new object's own contribution reflects the relationship.
//!
//! Downstream consumers (goal gate, HUD) are update-driven: every ledger
//! mutation is announced through a [`ScoreChanged`] event rather than
//! being polled each frame.

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::objects::ScoreTriple;
use crate::sets::SimulationSet;
use crate::Saveable;

// =============================================================================
// Ledger resource
// =============================================================================

/// Running totals for the session. All operations are O(1).
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    /// Sum of frozen contributions of all `Placed` objects.
    pub committed: ScoreTriple,
    /// Live contribution of the object currently being placed. Zero while
    /// nothing is in progress.
    pub potential: ScoreTriple,
}

impl ScoreLedger {
    /// Incremental update from the proximity tracker while placing.
    pub fn apply_potential(&mut self, delta: ScoreTriple) {
        self.potential += delta;
    }

    /// Direct committed-side adjustment (snapshot rehydration).
    pub fn apply_committed(&mut self, delta: ScoreTriple) {
        self.committed += delta;
    }

    /// Move a contribution from the potential side to the committed side.
    pub fn commit(&mut self, contribution: ScoreTriple) {
        self.potential -= contribution;
        self.committed += contribution;
    }

    /// Reverse a previously committed contribution (undo, banishment of a
    /// single object).
    pub fn revoke(&mut self, frozen: ScoreTriple) {
        self.committed -= frozen;
    }

    /// Zero everything. Used by banishment; idempotent.
    pub fn reset(&mut self) {
        *self = ScoreLedger::default();
    }
}

// =============================================================================
// Change notification
// =============================================================================

/// Emitted once per tick whenever the ledger changed, carrying the new
/// totals so observers never have to re-query.
#[derive(Event, Debug, Clone, Copy)]
pub struct ScoreChanged {
    pub committed: ScoreTriple,
    pub potential: ScoreTriple,
}

fn publish_score_changes(ledger: Res<ScoreLedger>, mut events: EventWriter<ScoreChanged>) {
    if ledger.is_changed() && !ledger.is_added() {
        events.send(ScoreChanged {
            committed: ledger.committed,
            potential: ledger.potential,
        });
    }
}

// =============================================================================
// Persistence
// =============================================================================

#[derive(Encode, Decode, Default)]
struct ScoreLedgerSave {
    committed: ScoreTriple,
}

impl Saveable for ScoreLedger {
    const SAVE_KEY: &'static str = "score_ledger";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.committed == ScoreTriple::ZERO {
            return None;
        }
        // The potential side is transient cursor state and never persists.
        Some(bitcode::encode(&ScoreLedgerSave {
            committed: self.committed,
        }))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        let save: ScoreLedgerSave = crate::decode_or_warn(Self::SAVE_KEY, bytes);
        Self {
            committed: save.committed,
            potential: ScoreTriple::ZERO,
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct ScoringPlugin;

impl Plugin for ScoringPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScoreLedger>()
            .add_event::<ScoreChanged>()
            .add_systems(
                FixedUpdate,
                publish_score_changes.in_set(SimulationSet::Progress),
            );

        app.init_resource::<crate::SaveableRegistry>();
        let mut registry = app.world_mut().resource_mut::<crate::SaveableRegistry>();
        registry.register::<ScoreLedger>();
    }
}
