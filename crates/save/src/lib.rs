//! Session persistence for Haven.
//!
//! A session file is a 28-byte header (magic, version, flags, checksum)
//! followed by an LZ4-compressed bitcode payload: the structural
//! [`SessionSnapshot`] plus the extension map collected from every
//! resource registered in the simulation's `SaveableRegistry`.
//!
//! Drivers trigger saves by sending [`SaveRequested`] / [`LoadRequested`]
//! events; the exclusive systems here do the world walking. The pure
//! [`save_to_path`] / [`load_from_path`] entry points serve headless
//! callers that own the `World` directly.
//!
//! [`SessionSnapshot`]: simulation::snapshot::SessionSnapshot

use std::path::{Path, PathBuf};

use bevy::prelude::*;

use simulation::snapshot;
use simulation::SaveableRegistry;

pub mod atomic_write;
pub mod codec;
pub mod file_header;
pub mod save_error;

pub use codec::{SaveData, CURRENT_SAVE_VERSION};
pub use save_error::SaveError;

// ---------------------------------------------------------------------------
// World <-> SaveData
// ---------------------------------------------------------------------------

/// Walk the world into a [`SaveData`]: structural snapshot first, then one
/// extension entry per registered saveable resource.
pub fn collect_save_data(world: &mut World) -> SaveData {
    let snapshot = snapshot::capture(world);
    let extensions = world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
        registry.save_all(world)
    });
    SaveData {
        version: CURRENT_SAVE_VERSION,
        snapshot,
        extensions,
    }
}

/// Rehydrate the world from a [`SaveData`].
///
/// The snapshot restore runs first and establishes a consistent baseline
/// (template goal counts, committed totals from the snapshot); the
/// extension map then overwrites each registered resource it has an entry
/// for, restoring exact working state. Absent keys keep the baseline,
/// which is what skip-when-default saving produces for them.
pub fn apply_save_data(world: &mut World, data: &SaveData) {
    snapshot::restore(world, &data.snapshot);
    world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
        registry.load_all(world, &data.extensions);
    });
}

// ---------------------------------------------------------------------------
// File entry points
// ---------------------------------------------------------------------------

/// Capture the session and write it to `path` atomically.
pub fn save_to_path(world: &mut World, path: &Path) -> Result<(), SaveError> {
    let data = collect_save_data(world);
    let bytes = codec::encode_bytes(&data);
    atomic_write::atomic_write(path, &bytes)?;
    info!(
        "saved session to {} ({} bytes, {} placed objects)",
        path.display(),
        bytes.len(),
        data.snapshot.placed.len()
    );
    Ok(())
}

/// Read `path` and rehydrate the session from it.
pub fn load_from_path(world: &mut World, path: &Path) -> Result<(), SaveError> {
    let bytes = std::fs::read(path)?;
    let data = codec::decode_bytes(&bytes)?;
    apply_save_data(world, &data);
    info!(
        "loaded session from {} ({} placed objects, goal {})",
        path.display(),
        data.snapshot.placed.len(),
        data.snapshot.goal_index
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Event-driven plugin surface
// ---------------------------------------------------------------------------

/// Ask the engine to save the session to a file.
#[derive(Event, Debug, Clone)]
pub struct SaveRequested {
    pub path: PathBuf,
}

/// Ask the engine to replace the session with one loaded from a file.
#[derive(Event, Debug, Clone)]
pub struct LoadRequested {
    pub path: PathBuf,
}

fn process_save_requests(world: &mut World) {
    let paths: Vec<PathBuf> = world
        .resource_mut::<Events<SaveRequested>>()
        .drain()
        .map(|request| request.path)
        .collect();
    for path in paths {
        if let Err(e) = save_to_path(world, &path) {
            error!("save to {} failed: {e}", path.display());
        }
    }
}

fn process_load_requests(world: &mut World) {
    let paths: Vec<PathBuf> = world
        .resource_mut::<Events<LoadRequested>>()
        .drain()
        .map(|request| request.path)
        .collect();
    for path in paths {
        if let Err(e) = load_from_path(world, &path) {
            error!("load from {} failed: {e}", path.display());
        }
    }
}

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveRequested>()
            .add_event::<LoadRequested>()
            // Outside FixedUpdate: requests apply between simulation ticks.
            .add_systems(Update, (process_save_requests, process_load_requests));
    }
}
