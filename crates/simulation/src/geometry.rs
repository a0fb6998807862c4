//! Reference geometry provider: bucketed spatial index, neighbor
//! enter/exit scan, and the grounded/collided validity flags.
//!
//! The gameplay core only consumes [`NeighborEntered`] / [`NeighborExited`]
//! events and the flags on [`PlacedObject`], so a real physics layer can
//! replace this plugin wholesale without touching scoring or placement.
//!
//! Two distinct radii are in play: the wide sensing radius
//! ([`PROXIMITY_RADIUS`]) drives adjacency scoring, while the per-type
//! footprint radius drives the tight collision check.

use bevy::prelude::*;

use crate::config::{PROXIMITY_RADIUS, WORLD_EXTENT};
use crate::objects::{BuildState, PlacedObject, Position};
use crate::proximity::ProximitySet;
use crate::sets::SimulationSet;

const BUCKET_SIZE: f32 = 64.0;
// Pad one bucket on each side so objects right at the world edge still index.
const BUCKETS_PER_AXIS: usize = ((WORLD_EXTENT * 2.0 / BUCKET_SIZE) as usize) + 2;
const TOTAL_BUCKETS: usize = BUCKETS_PER_AXIS * BUCKETS_PER_AXIS;

/// Vertical tolerance for the grounded check: the terrain is a flat plane
/// at y = 0 in this provider.
const GROUND_EPSILON: f32 = 0.5;

// =============================================================================
// Spatial index
// =============================================================================

/// Coarse bucket grid over the X/Z plane, rebuilt every tick from live
/// object positions.
#[derive(Resource)]
pub struct SpatialIndex {
    buckets: Vec<Vec<Entity>>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self {
            buckets: (0..TOTAL_BUCKETS).map(|_| Vec::new()).collect(),
        }
    }
}

impl SpatialIndex {
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    pub fn insert(&mut self, entity: Entity, x: f32, z: f32) {
        if let Some(idx) = Self::flat_index(Self::bucket_coord(x), Self::bucket_coord(z)) {
            self.buckets[idx].push(entity);
        }
    }

    /// All entities whose bucket overlaps a circle at (`x`, `z`). May
    /// contain false positives; callers re-check exact distance.
    pub fn query_circle(&self, x: f32, z: f32, radius: f32) -> Vec<Entity> {
        let min_bx = Self::bucket_coord(x - radius);
        let max_bx = Self::bucket_coord(x + radius);
        let min_bz = Self::bucket_coord(z - radius);
        let max_bz = Self::bucket_coord(z + radius);

        let mut result = Vec::new();
        for bz in min_bz..=max_bz {
            for bx in min_bx..=max_bx {
                if let Some(idx) = Self::flat_index(bx, bz) {
                    result.extend_from_slice(&self.buckets[idx]);
                }
            }
        }
        result
    }

    #[inline]
    fn bucket_coord(v: f32) -> i32 {
        ((v + WORLD_EXTENT + BUCKET_SIZE) / BUCKET_SIZE).floor() as i32
    }

    #[inline]
    fn flat_index(bx: i32, bz: i32) -> Option<usize> {
        if bx >= 0 && bz >= 0 && (bx as usize) < BUCKETS_PER_AXIS && (bz as usize) < BUCKETS_PER_AXIS
        {
            Some(bz as usize * BUCKETS_PER_AXIS + bx as usize)
        } else {
            None
        }
    }

    pub fn entity_count(&self) -> usize {
        self.buckets.iter().map(|v| v.len()).sum()
    }
}

// =============================================================================
// Events
// =============================================================================

/// `neighbor` has entered `subject`'s sensing radius.
#[derive(Event, Debug, Clone, Copy)]
pub struct NeighborEntered {
    pub subject: Entity,
    pub neighbor: Entity,
}

/// `neighbor` has left `subject`'s sensing radius (moved away or was
/// destroyed).
#[derive(Event, Debug, Clone, Copy)]
pub struct NeighborExited {
    pub subject: Entity,
    pub neighbor: Entity,
}

// =============================================================================
// Systems
// =============================================================================

fn refresh_spatial_index(
    mut index: ResMut<SpatialIndex>,
    objects: Query<(Entity, &Position), With<PlacedObject>>,
) {
    index.clear();
    for (entity, pos) in &objects {
        index.insert(entity, pos.translation.x, pos.translation.z);
    }
}

/// Diff each object's live sensing circle against its tracked neighbor set
/// and emit enter/exit events for the differences. Runs for `Placed`
/// subjects too: their sets stay current even though set changes no longer
/// move scores (see `proximity`).
fn scan_proximity(
    index: Res<SpatialIndex>,
    objects: Query<(Entity, &Position, &ProximitySet), With<PlacedObject>>,
    positions: Query<&Position, With<PlacedObject>>,
    mut entered: EventWriter<NeighborEntered>,
    mut exited: EventWriter<NeighborExited>,
) {
    for (subject, pos, tracker) in &objects {
        let (x, z) = (pos.translation.x, pos.translation.z);
        for candidate in index.query_circle(x, z, PROXIMITY_RADIUS) {
            if candidate == subject || tracker.contains(candidate) {
                continue;
            }
            let Ok(other) = positions.get(candidate) else {
                continue;
            };
            if in_sensing_range(pos, other) {
                entered.send(NeighborEntered {
                    subject,
                    neighbor: candidate,
                });
            }
        }
        for &neighbor in tracker.neighbors() {
            let still_near = positions
                .get(neighbor)
                .is_ok_and(|other| in_sensing_range(pos, other));
            if !still_near {
                exited.send(NeighborExited { subject, neighbor });
            }
        }
    }
}

fn in_sensing_range(a: &Position, b: &Position) -> bool {
    let dx = a.translation.x - b.translation.x;
    let dz = a.translation.z - b.translation.z;
    dx * dx + dz * dz <= PROXIMITY_RADIUS * PROXIMITY_RADIUS
}

/// Recompute `grounded` and `collided` for the object being placed.
/// Settled objects keep the flags they committed with.
fn update_validity(
    index: Res<SpatialIndex>,
    mut objects: ParamSet<(
        Query<(Entity, &PlacedObject, &Position)>,
        Query<(Entity, &mut PlacedObject, &Position)>,
    )>,
) {
    // Snapshot footprints first; the mutable pass below would otherwise
    // alias the same component.
    let footprints: Vec<(Entity, f32, f32, f32)> = objects
        .p0()
        .iter()
        .map(|(entity, obj, pos)| {
            (
                entity,
                obj.object_type.footprint_radius(),
                pos.translation.x,
                pos.translation.z,
            )
        })
        .collect();

    for (entity, mut obj, pos) in &mut objects.p1() {
        if obj.state != BuildState::Placing {
            continue;
        }
        let footprint = obj.object_type.footprint_radius();
        let (x, z) = (pos.translation.x, pos.translation.z);

        let grounded = x.abs() <= WORLD_EXTENT - footprint
            && z.abs() <= WORLD_EXTENT - footprint
            && pos.translation.y.abs() <= GROUND_EPSILON;

        // Widest possible footprint pair bounds the candidate query.
        let candidates = index.query_circle(x, z, footprint + PROXIMITY_RADIUS);
        let mut collided = false;
        for &(other, other_footprint, ox, oz) in &footprints {
            if other == entity || !candidates.contains(&other) {
                continue;
            }
            let limit = footprint + other_footprint;
            let dx = x - ox;
            let dz = z - oz;
            if dx * dx + dz * dz < limit * limit {
                collided = true;
                break;
            }
        }

        // Avoid tripping change detection when nothing moved.
        if obj.grounded != grounded || obj.collided != collided {
            obj.grounded = grounded;
            obj.collided = collided;
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct GeometryPlugin;

impl Plugin for GeometryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpatialIndex>()
            .add_event::<NeighborEntered>()
            .add_event::<NeighborExited>()
            .add_systems(
                FixedUpdate,
                (refresh_spatial_index, scan_proximity, update_validity)
                    .chain()
                    .in_set(SimulationSet::Geometry),
            );
    }
}
