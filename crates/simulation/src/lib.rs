//! Haven gameplay engine: proximity-driven placement scoring and goal
//! progression for a settlement-builder.
//!
//! Everything runs single-threaded inside the `FixedUpdate` schedule at
//! 10 Hz, phased through [`sets::SimulationSet`] so geometry events are
//! fully drained before scores are recomputed, and scores settle before
//! the goal gate is evaluated, all within one tick.

use bevy::prelude::*;
use std::collections::BTreeMap;

pub mod adjacency;
pub mod banish;
pub mod config;
pub mod geometry;
pub mod goals;
pub mod objects;
pub mod placement;
pub mod proximity;
pub mod scoring;
pub mod sets;
pub mod snapshot;
pub mod undo;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
pub mod test_harness;

pub use sets::SimulationSet;

// ---------------------------------------------------------------------------
// Saveable trait + registry for the extension map save pattern
// ---------------------------------------------------------------------------

/// Trait for resources that persist through the save file's extension map.
///
/// Each implementing resource owns its serialization, so adding a new
/// saveable feature never touches the save pipeline -- the feature plugin
/// registers itself in its `build()`.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Unique key in the save file's extension map. Must be stable across
    /// versions.
    const SAVE_KEY: &'static str;

    /// Serialize this resource to bytes. Return `None` to skip saving
    /// (e.g. when the resource is at its default state).
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    /// Deserialize from bytes, returning the restored resource.
    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Decode bytes via `bitcode::decode`, logging a warning and returning
/// `Default` on failure.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    match bitcode::decode(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Saveable {}: failed to decode {} bytes, falling back to default: {}",
                key,
                bytes.len(),
                e
            );
            T::default()
        }
    }
}

/// Type alias for the save function stored in a `SaveableEntry`.
pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
/// Type alias for the load function stored in a `SaveableEntry`.
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;
/// Type alias for the reset function stored in a `SaveableEntry`.
pub type ResetFn = Box<dyn Fn(&mut World) + Send + Sync>;

/// Type-erased save/load/reset operations for one registered resource.
pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
    pub reset_fn: ResetFn,
}

/// Registry of all saveable resources, populated during plugin setup.
///
/// The save pipeline iterates this registry to persist/restore extension
/// map entries without knowing individual feature types.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Register a resource type that implements [`Saveable`].
    ///
    /// Duplicate keys are ignored with a warning (and trip a debug
    /// assertion) to prevent silent data loss.
    pub fn register<T: Saveable>(&mut self) {
        let key = T::SAVE_KEY.to_string();
        if self.entries.iter().any(|e| e.key == key) {
            warn!(
                "SaveableRegistry: duplicate key '{}' -- ignoring second registration",
                key
            );
            debug_assert!(false, "SaveableRegistry: duplicate key '{}'", key);
            return;
        }
        self.entries.push(SaveableEntry {
            key,
            save_fn: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(|r| r.save_to_bytes())
            }),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                let value = T::load_from_bytes(bytes);
                world.insert_resource(value);
            }),
            reset_fn: Box::new(|world: &mut World| {
                world.insert_resource(T::default());
            }),
        });
    }

    /// Save all registered resources into an extension map.
    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        let mut extensions = BTreeMap::new();
        for entry in &self.entries {
            if let Some(bytes) = (entry.save_fn)(world) {
                extensions.insert(entry.key.clone(), bytes);
            }
        }
        extensions
    }

    /// Load registered resources from an extension map. Resources whose
    /// key is absent keep their current value.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            if let Some(bytes) = extensions.get(&entry.key) {
                (entry.load_fn)(world, bytes);
            }
        }
    }

    /// Reset all registered resources to their defaults (new game / banish).
    pub fn reset_all(&self, world: &mut World) {
        for entry in &self.entries {
            (entry.reset_fn)(world);
        }
    }
}

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each `FixedUpdate`.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

fn advance_tick(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // One logical tick = one fixed update at 10 Hz.
        app.insert_resource(Time::<Fixed>::from_hz(10.0));

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Geometry,
                SimulationSet::Scoring,
                SimulationSet::Placement,
                SimulationSet::Progress,
            )
                .chain(),
        );

        app.init_resource::<TickCounter>()
            .init_resource::<SaveableRegistry>()
            .add_systems(FixedUpdate, advance_tick.in_set(SimulationSet::Geometry));

        app.add_plugins((
            geometry::GeometryPlugin,
            proximity::ProximityPlugin,
            scoring::ScoringPlugin,
            placement::PlacementPlugin,
            banish::BanishPlugin,
            goals::GoalsPlugin,
        ));
    }
}
