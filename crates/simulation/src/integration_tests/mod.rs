//! Integration tests driven through the [`TestLevel`] harness: a headless
//! Bevy App running `SimulationPlugin` at the real 10 Hz fixed tick, fed
//! only through the public command queue.
//!
//! [`TestLevel`]: crate::test_harness::TestLevel

mod banishment;
mod goal_progression;
mod scoring_scenarios;
mod snapshot_roundtrip;
mod undo_window;
