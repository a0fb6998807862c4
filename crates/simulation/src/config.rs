//! Tuning constants and the runtime placement configuration resource.

use bevy::prelude::*;

/// Sensing radius for adjacency scoring, in world units. Two objects are
/// neighbors when their centers are closer than this. Distinct from the
/// per-type footprint radius used for the collision check.
pub const PROXIMITY_RADIUS: f32 = 24.0;

/// Half-extent of the buildable area along X and Z. An object is grounded
/// only while its footprint stays inside this square.
pub const WORLD_EXTENT: f32 = 512.0;

/// Default capacity of the placement undo window. Pushing past this evicts
/// the oldest entry, making that placement permanent.
pub const DEFAULT_UNDO_CAPACITY: usize = 8;

/// Runtime-tunable placement parameters.
#[derive(Resource, Debug, Clone)]
pub struct PlacementConfig {
    /// Maximum number of undoable placements. Read at push time, so
    /// shrinking it takes effect on the next commit rather than eagerly
    /// truncating the window.
    pub undo_capacity: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            undo_capacity: DEFAULT_UNDO_CAPACITY,
        }
    }
}
