//! Deterministic tick ordering via `SystemSet` phases.
//!
//! Every gameplay system in `FixedUpdate` belongs to one of these sets,
//! configured as a chain so inter-plugin ordering is explicit rather than
//! relying on implicit timing assumptions.
//!
//! ```text
//! Geometry  →  Scoring  →  Placement  →  Progress
//! ```
//!
//! * **Geometry** – spatial index refresh, neighbor enter/exit scan,
//!   grounded/collided flag updates. Membership changes are fully applied
//!   here before anything downstream reads a score.
//! * **Scoring** – proximity event consumption and incremental potential
//!   recomputation for the object being placed.
//! * **Placement** – the command executor: select, move, commit, cancel,
//!   undo. A commit batched behind a select or move in the same tick is
//!   held over to the next tick, so a commit always reads validity flags
//!   and a neighbor contribution that geometry computed for the object's
//!   current position.
//! * **Progress** – goal bookkeeping and the advance gate, plus score
//!   change notifications. Read-only with respect to geometry and the
//!   ledger's per-object contributions.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
///
/// Configured as a chain: `Geometry` → `Scoring` → `Placement` → `Progress`.
/// Plugins register systems with `.in_set(SimulationSet::X)`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Spatial index refresh, proximity scan, validity flags.
    Geometry,
    /// Neighbor-set maintenance and potential score recomputation.
    Scoring,
    /// Placement command execution (select/move/commit/cancel/undo).
    Placement,
    /// Goal gate evaluation, advancement, and observer notifications.
    Progress,
}
