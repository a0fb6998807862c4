//! Per-object proximity tracking: each builder object carries the set of
//! neighbors currently inside its sensing radius, and the object being
//! placed recomputes its potential contribution whenever that set
//! changes.
//!
//! Tracking is one-directional in score terms but symmetric in
//! membership: a settled (`Placed`) object keeps its neighbor set current
//! so it can be revived by undo, yet membership changes while settled
//! emit **no** score deltas. A building's score is frozen at commit time;
//! new construction nearby never re-scores it after the fact.

use bevy::prelude::*;
use bevy::utils::{HashMap, HashSet};

use crate::adjacency::AdjacencyRules;
use crate::geometry::{NeighborEntered, NeighborExited};
use crate::objects::{BuildState, ObjectType, PlacedObject, ScoreTriple};
use crate::scoring::ScoreLedger;
use crate::sets::SimulationSet;

// =============================================================================
// Component
// =============================================================================

/// Neighbor set and cached contribution for one builder object.
#[derive(Component, Debug, Default)]
pub struct ProximitySet {
    neighbors: HashSet<Entity>,
    /// Base score plus adjacency deltas for the current neighbor set.
    /// Only meaningful while the object is `Placing`; stale afterwards.
    contribution: ScoreTriple,
}

impl ProximitySet {
    /// Tracker for a freshly selected object whose base score has already
    /// been published to the potential ledger.
    pub fn seeded(base: ScoreTriple) -> Self {
        Self {
            neighbors: HashSet::new(),
            contribution: base,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.neighbors.contains(&entity)
    }

    pub fn neighbors(&self) -> impl Iterator<Item = &Entity> {
        self.neighbors.iter()
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn contribution(&self) -> ScoreTriple {
        self.contribution
    }

    /// Drop a neighbor edge, e.g. when the counterpart is destroyed.
    pub fn remove_neighbor(&mut self, entity: Entity) -> bool {
        self.neighbors.remove(&entity)
    }

    /// Recompute the cached contribution from the current neighbor set,
    /// returning the delta against the previous cache.
    pub fn recompute(
        &mut self,
        subject: ObjectType,
        rules: &AdjacencyRules,
        type_of: impl Fn(Entity) -> Option<ObjectType>,
    ) -> ScoreTriple {
        let fresh = rules.contribution(
            subject,
            self.neighbors.iter().filter_map(|&e| type_of(e)),
        );
        let delta = fresh - self.contribution;
        self.contribution = fresh;
        delta
    }

    /// Reset the cache without touching the neighbor set. Used when an
    /// object re-enters `Placing` via undo and its contribution is about
    /// to be rebuilt from scratch.
    pub fn reset_contribution(&mut self) {
        self.contribution = ScoreTriple::ZERO;
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Drain the tick's membership events, update neighbor sets on both
/// sides, and apply the resulting potential delta for the placing object.
fn apply_proximity_events(
    mut entered: EventReader<NeighborEntered>,
    mut exited: EventReader<NeighborExited>,
    rules: Res<AdjacencyRules>,
    mut ledger: ResMut<ScoreLedger>,
    mut trackers: Query<(Entity, &PlacedObject, &mut ProximitySet)>,
) {
    let mut touched: HashSet<Entity> = HashSet::new();

    // Membership first, across every affected subject, so recomputation
    // below always sees fully-applied sets (both trackers updated).
    for event in entered.read() {
        if let Ok((_, _, mut tracker)) = trackers.get_mut(event.subject) {
            if tracker.neighbors.insert(event.neighbor) {
                touched.insert(event.subject);
            }
        }
    }
    for event in exited.read() {
        if let Ok((_, _, mut tracker)) = trackers.get_mut(event.subject) {
            if tracker.remove_neighbor(event.neighbor) {
                touched.insert(event.subject);
            }
        }
    }

    if touched.is_empty() {
        return;
    }

    let types: HashMap<Entity, ObjectType> = trackers
        .iter()
        .map(|(entity, obj, _)| (entity, obj.object_type))
        .collect();

    for subject in touched {
        let Ok((_, obj, mut tracker)) = trackers.get_mut(subject) else {
            continue;
        };
        // Score emission is gated on state: a settled object tracks
        // membership silently.
        if obj.state != BuildState::Placing {
            continue;
        }
        let delta = tracker.recompute(obj.object_type, &rules, |e| types.get(&e).copied());
        if delta != ScoreTriple::ZERO {
            ledger.apply_potential(delta);
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct ProximityPlugin;

impl Plugin for ProximityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AdjacencyRules>().add_systems(
            FixedUpdate,
            apply_proximity_events.in_set(SimulationSet::Scoring),
        );
    }
}
