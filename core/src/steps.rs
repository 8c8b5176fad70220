//! First step of each scripted scenario run by the sequence machine.
//!
//! Scenarios occupy sparse ranges; a scenario's later steps are numbered
//! upward from its first one.

/// Normal play; polls for the goal and the timer.
pub const PLAY: u16 = 0;
/// The player walks in from the left while the bus pulls away.
pub const APPROACH: u16 = 100;
/// The door closes and the bus leaves with the player aboard.
pub const BUS_LEAVING: u16 = 200;
/// Time ran out with the bus close enough to watch it leave.
pub const TIME_UP_NEAR: u16 = 300;
/// Time ran out far from the bus.
pub const TIME_UP_FAR: u16 = 350;
/// The player walks to the door and boards.
pub const GOAL_PLAIN: u16 = 400;
/// The door slams and the bus creeps forward before boarding.
pub const GOAL_DOOR_SLAM: u16 = 500;
/// The driver throws a peel at the player before boarding.
pub const GOAL_PEEL_THROW: u16 = 600;
/// Final level: flagman, traffic jam and the bus stuck in it.
pub const ENDING: u16 = 900;
/// Terminal step; the outcome is exposed to the orchestrator.
pub const FINISHED: u16 = 9999;
