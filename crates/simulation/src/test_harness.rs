//! TestLevel -- headless integration harness for the gameplay engine.
//!
//! Wraps `bevy::app::App` + [`SimulationPlugin`] with no window or
//! renderer. Command helpers push into the [`CommandQueue`]; `tick()`
//! advances virtual time by one 100ms fixed step so exactly one
//! simulation tick runs per call.
//!
//! Phase timing to remember when scripting: a `Select` spawn flushes at
//! the end of its tick, the geometry scan sees the object on the next
//! tick, so `select → tick → move → tick → commit` is the minimal valid
//! sequence (which `place()` wraps).

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::goals::GoalProgress;
use crate::objects::{ObjectType, PlacedObject, Position};
use crate::placement::{ActivePlacement, CommandLog, CommandQueue, PlacementCommand};
use crate::scoring::ScoreLedger;
use crate::undo::UndoHistory;
use crate::SimulationPlugin;

/// A headless Bevy App wrapping [`SimulationPlugin`] for tests.
pub struct TestLevel {
    app: App,
}

impl TestLevel {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        // Pin the clock to one fixed step per update. time_system rebuilds
        // virtual time from the real clock every frame, so nudging
        // Time<Virtual> directly would be overwritten before FixedUpdate
        // ever accumulated a step.
        app.insert_resource(TimeUpdateStrategy::ManualDuration(
            std::time::Duration::from_millis(100),
        ));
        // Run one update so startup work completes before the first tick
        // (the first manual update reports a zero delta).
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------------

    /// Advance the simulation by `n` fixed ticks (100ms each).
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub fn push(&mut self, command: PlacementCommand) -> &mut Self {
        self.app
            .world_mut()
            .resource_mut::<CommandQueue>()
            .push(command);
        self
    }

    /// Select a type and tick once so the spawn is visible to geometry.
    pub fn select(&mut self, object_type: ObjectType) -> &mut Self {
        self.push(PlacementCommand::Select { object_type });
        self.tick(1);
        self
    }

    /// Move the in-progress object on the ground plane and tick once so
    /// geometry re-evaluates neighbors and validity.
    pub fn move_to(&mut self, x: f32, z: f32) -> &mut Self {
        self.push(PlacementCommand::Move {
            x,
            y: 0.0,
            z,
            yaw: 0.0,
        });
        self.tick(2);
        self
    }

    pub fn commit(&mut self) -> &mut Self {
        self.push(PlacementCommand::Commit);
        self.tick(1);
        self
    }

    pub fn cancel(&mut self) -> &mut Self {
        self.push(PlacementCommand::Cancel);
        self.tick(1);
        self
    }

    pub fn undo(&mut self) -> &mut Self {
        self.push(PlacementCommand::Undo);
        self.tick(2);
        self
    }

    pub fn advance_goal(&mut self) -> &mut Self {
        self.push(PlacementCommand::AdvanceGoal);
        self.tick(1);
        self
    }

    pub fn banish(&mut self) -> &mut Self {
        self.push(PlacementCommand::Banish);
        self.tick(1);
        self
    }

    /// Full fresh-placement sequence: select, move into position, commit.
    pub fn place(&mut self, object_type: ObjectType, x: f32, z: f32) -> &mut Self {
        self.select(object_type).move_to(x, z).commit()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn ledger(&self) -> &ScoreLedger {
        self.app.world().resource::<ScoreLedger>()
    }

    pub fn goals(&self) -> &GoalProgress {
        self.app.world().resource::<GoalProgress>()
    }

    pub fn log(&self) -> &CommandLog {
        self.app.world().resource::<CommandLog>()
    }

    pub fn history_len(&self) -> usize {
        self.app.world().resource::<UndoHistory>().len()
    }

    pub fn active(&self) -> Option<Entity> {
        self.app.world().resource::<ActivePlacement>().entity()
    }

    pub fn object_count(&mut self) -> usize {
        self.app
            .world_mut()
            .query::<&PlacedObject>()
            .iter(self.app.world())
            .count()
    }

    /// The live object of a given type closest to (`x`, `z`).
    pub fn object_at(&mut self, object_type: ObjectType, x: f32, z: f32) -> Option<Entity> {
        let mut best: Option<(Entity, f32)> = None;
        let mut query = self.app.world_mut().query::<(Entity, &PlacedObject, &Position)>();
        for (entity, obj, pos) in query.iter(self.app.world()) {
            if obj.object_type != object_type {
                continue;
            }
            let dx = pos.translation.x - x;
            let dz = pos.translation.z - z;
            let dist = dx * dx + dz * dz;
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((entity, dist));
            }
        }
        best.map(|(entity, _)| entity)
    }
}

impl Default for TestLevel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TickCounter;

    #[test]
    fn tick_runs_exactly_one_fixed_step_per_call() {
        let mut level = TestLevel::new();
        assert_eq!(level.world_mut().resource::<TickCounter>().0, 0);
        level.tick(1);
        assert_eq!(level.world_mut().resource::<TickCounter>().0, 1);
        level.tick(9);
        assert_eq!(level.world_mut().resource::<TickCounter>().0, 10);
    }
}
