//! Headless Haven driver: a minimal Bevy App running the gameplay engine
//! with no rendering or UI, fed by a scripted command sequence.
//!
//! The binary plays through the first goal (two cabins, a wind turbine,
//! an orchard), advances, saves the session, and exits. It doubles as a
//! smoke test for the whole command surface: any driver (HUD, agent,
//! replay) talks to the engine exactly the way this script does.
//!
//! Set `HAVEN_SAVE` to choose the session file path (default
//! `haven_session.hvn`).

use std::path::PathBuf;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

use save::{SavePlugin, SaveRequested};
use simulation::goals::{GoalAdvanced, LevelComplete};
use simulation::objects::ObjectType;
use simulation::placement::{CommandQueue, PlacementCommand};
use simulation::scoring::ScoreChanged;
use simulation::{SimulationPlugin, TickCounter};

fn main() {
    let mut app = App::new();

    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(20))),
    );
    app.add_plugins(bevy::log::LogPlugin::default());
    app.add_plugins((SimulationPlugin, SavePlugin));

    app.insert_resource(DemoScript::first_goal());
    app.add_systems(Update, (drive_script, report_progress));

    app.run();
}

fn save_path() -> PathBuf {
    std::env::var("HAVEN_SAVE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("haven_session.hvn"))
}

#[derive(Clone)]
enum Step {
    Command(PlacementCommand),
    Save,
    Exit,
}

/// Tick-stamped steps, released to the command queue in order.
#[derive(Resource)]
struct DemoScript {
    steps: Vec<(u64, Step)>,
    next: usize,
}

impl DemoScript {
    /// Play out the first goal along the x axis, spaced so nothing lands
    /// in sensing range of anything else.
    fn first_goal() -> Self {
        let mut steps = Vec::new();
        let mut t = 1;
        for (object_type, x) in [
            (ObjectType::Cabin, 0.0),
            (ObjectType::Cabin, 60.0),
            (ObjectType::WindTurbine, 120.0),
            (ObjectType::Orchard, 180.0),
        ] {
            steps.push((t, Step::Command(PlacementCommand::Select { object_type })));
            steps.push((
                t + 1,
                Step::Command(PlacementCommand::Move {
                    x,
                    y: 0.0,
                    z: 0.0,
                    yaw: 0.0,
                }),
            ));
            // A tick of slack so the geometry pass validates the move.
            steps.push((t + 3, Step::Command(PlacementCommand::Commit)));
            t += 5;
        }
        steps.push((t, Step::Command(PlacementCommand::AdvanceGoal)));
        steps.push((t + 2, Step::Save));
        steps.push((t + 4, Step::Exit));
        Self { steps, next: 0 }
    }
}

fn drive_script(
    tick: Res<TickCounter>,
    mut script: ResMut<DemoScript>,
    mut queue: ResMut<CommandQueue>,
    mut saves: EventWriter<SaveRequested>,
    mut exit: EventWriter<AppExit>,
) {
    loop {
        let Some((at, step)) = script.steps.get(script.next) else {
            break;
        };
        if *at > tick.0 {
            break;
        }
        let step = step.clone();
        script.next += 1;
        match step {
            Step::Command(command) => queue.push(command),
            Step::Save => {
                saves.send(SaveRequested { path: save_path() });
            }
            Step::Exit => {
                exit.send(AppExit::Success);
            }
        }
    }
}

fn report_progress(
    mut scores: EventReader<ScoreChanged>,
    mut advanced: EventReader<GoalAdvanced>,
    mut complete: EventReader<LevelComplete>,
) {
    for event in scores.read() {
        info!(
            "score: committed {:?}, potential {:?}",
            event.committed, event.potential
        );
    }
    for event in advanced.read() {
        info!(
            "goal {} is now current (viability floor {})",
            event.goal_index, event.minimum_viability
        );
    }
    if complete.read().next().is_some() {
        info!("level complete");
    }
}
