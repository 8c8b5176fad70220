#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scripted sequence machine that choreographs the approach, goal, time-up
//! and ending scenes of a level.
//!
//! The cursor holds a sparse step id and a countdown. Once the countdown runs
//! out the current step either acts and names the step that follows, or polls
//! the world and waits. At most one step is evaluated per frame.

use last_bus_core::{
    elapsed, steps, Actions, Difficulty, Event, GameData, MusicId, Outcome, PhysicsParams,
    PlayerState, SoundId,
};
use last_bus_world::{Animation, AnimationKind, Bus, Player, World};

mod ending;
mod goal;
mod street;

/// Acceleration of the bus when it pulls away.
pub const BUS_ACCEL: f32 = 240.0;

/// Top speed of the bus.
pub const BUS_MAX_SPEED: f32 = 480.0;

/// Distance past the bus rear the player must walk before the driver throws
/// a peel in the peel-throw scene.
pub const DRIVER_THROW_REACH: f32 = 192.0;

/// Pause between the player boarding and the door closing.
const BOARD_DELAY: f32 = 0.5;

/// First step of the scene played when the player reaches the bus.
#[must_use]
pub fn goal_scenario(data: &GameData, difficulty: Difficulty, level: u32) -> u16 {
    data.difficulty(difficulty).goal_scene(level).first_step()
}

/// Sparse step machine advancing the world's sequence cursor.
#[derive(Debug, Default)]
pub struct Sequence;

impl Sequence {
    /// Counts the cursor delay down and evaluates the current step once it
    /// has elapsed.
    pub fn handle(
        &mut self,
        events: &[Event],
        world: &mut World,
        params: &PhysicsParams,
        data: &GameData,
        out_events: &mut Vec<Event>,
    ) {
        let Some(dt) = elapsed(events) else {
            return;
        };
        let dt = dt.as_secs_f32().min(params.max_frame_dt);

        let cursor = world.sequence_mut();
        if cursor.step == steps::FINISHED {
            return;
        }
        if cursor.delay > 0.0 {
            cursor.delay -= dt;
            if cursor.delay > 0.0 {
                return;
            }
            cursor.delay = 0.0;
        }
        let step = cursor.step;

        let mut scene = Scene {
            world,
            params,
            data,
            out_events,
        };
        let flow = match step {
            steps::PLAY => street::play(&mut scene),
            s if (steps::APPROACH..steps::BUS_LEAVING).contains(&s) => {
                street::approach(s - steps::APPROACH, &mut scene)
            }
            s if (steps::BUS_LEAVING..steps::TIME_UP_NEAR).contains(&s) => {
                street::bus_leaving(s - steps::BUS_LEAVING, &mut scene)
            }
            s if (steps::TIME_UP_NEAR..steps::TIME_UP_FAR).contains(&s) => {
                street::time_up_near(s - steps::TIME_UP_NEAR, &mut scene)
            }
            s if (steps::TIME_UP_FAR..steps::GOAL_PLAIN).contains(&s) => {
                street::time_up_far(s - steps::TIME_UP_FAR, &mut scene)
            }
            s if (steps::GOAL_PLAIN..steps::GOAL_DOOR_SLAM).contains(&s) => {
                goal::plain(s - steps::GOAL_PLAIN, &mut scene)
            }
            s if (steps::GOAL_DOOR_SLAM..steps::GOAL_PEEL_THROW).contains(&s) => {
                goal::door_slam(s - steps::GOAL_DOOR_SLAM, &mut scene)
            }
            s if (steps::GOAL_PEEL_THROW..steps::ENDING).contains(&s) => {
                goal::peel_throw(s - steps::GOAL_PEEL_THROW, &mut scene)
            }
            s if (steps::ENDING..steps::FINISHED).contains(&s) => {
                ending::step(s - steps::ENDING, &mut scene)
            }
            _ => Flow::Unknown,
        };

        match flow {
            Flow::Wait => {}
            Flow::Next { step: next, delay } => {
                let cursor = scene.world.sequence_mut();
                cursor.step = next;
                cursor.delay = delay;
                log::debug!("sequence step {step} -> {next} (delay {delay:.2}s)");
            }
            Flow::Unknown => {
                log::warn!("sequence cursor parked on unknown step {step}");
            }
        }
    }
}

/// Result of evaluating one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Flow {
    /// Poll the same step again next frame.
    Wait,
    /// Move to `step`, evaluated once `delay` seconds have passed.
    Next { step: u16, delay: f32 },
    /// The cursor names no step of any scene.
    Unknown,
}

impl Flow {
    pub(crate) const fn to(step: u16) -> Self {
        Self::Next { step, delay: 0.0 }
    }

    pub(crate) const fn after(step: u16, delay: f32) -> Self {
        Self::Next { step, delay }
    }
}

/// Mutable view over the world handed to each step.
pub(crate) struct Scene<'a> {
    pub(crate) world: &'a mut World,
    pub(crate) params: &'a PhysicsParams,
    pub(crate) data: &'a GameData,
    pub(crate) out_events: &'a mut Vec<Event>,
}

impl Scene<'_> {
    pub(crate) fn player(&self) -> Player {
        *self.world.player()
    }

    pub(crate) fn bus(&self) -> Bus {
        *self.world.bus()
    }

    pub(crate) fn sound(&mut self, sound: SoundId) {
        self.out_events.push(Event::SoundRequested { sound });
    }

    pub(crate) fn music(&mut self, music: MusicId) {
        self.out_events.push(Event::MusicRequested { music });
    }

    /// Replaces held input with `actions` from now on.
    pub(crate) fn script(&mut self, actions: Actions) {
        let cursor = self.world.sequence_mut();
        cursor.owns_input = true;
        cursor.scripted = actions;
    }

    pub(crate) fn at_door(&self) -> bool {
        self.player().x >= self.bus().door_x()
    }

    /// Hides the player inside the bus.
    pub(crate) fn board(&mut self) {
        self.script(Actions::empty());
        let params = self.params;
        if let Some(event) = self
            .world
            .player_mut()
            .transition(PlayerState::Inactive, params)
        {
            self.out_events.push(event);
        }
        self.sound(SoundId::BusDoor);
    }

    pub(crate) fn close_door(&mut self) {
        self.world.bus_mut().door_open = false;
        self.sound(SoundId::BusDoor);
    }

    pub(crate) fn open_door(&mut self) {
        self.world.bus_mut().door_open = true;
        self.sound(SoundId::BusDoor);
    }

    /// Starts the bus accelerating to the right.
    pub(crate) fn drive_off(&mut self) {
        let bus = self.world.bus_mut();
        bus.ax = BUS_ACCEL;
        bus.max_speed = BUS_MAX_SPEED;
        self.sound(SoundId::BusEngine);
    }

    /// Stops the bus where it stands.
    pub(crate) fn halt_bus(&mut self) {
        let bus = self.world.bus_mut();
        bus.vx = 0.0;
        bus.ax = 0.0;
        bus.max_speed = 0.0;
    }

    pub(crate) fn bus_out_of_view(&self) -> bool {
        self.bus().x > self.world.camera().right()
    }

    pub(crate) fn spawn_actor(&mut self, animation: Animation) {
        let spawned = self.world.animations_mut().insert(animation);
        debug_assert!(spawned.is_ok(), "actor slots were reserved at load");
    }

    /// Sets the walking speed of every actor playing `kind`.
    pub(crate) fn pace_actors(&mut self, kind: AnimationKind, vx: f32) {
        for (_, animation) in self.world.animations_mut().iter_mut() {
            if animation.kind == kind {
                animation.vx = vx;
            }
        }
    }

    /// Exposes `outcome` and parks the cursor on the terminal step.
    pub(crate) fn finish(&mut self, outcome: Outcome) -> Flow {
        self.script(Actions::empty());
        self.world.sequence_mut().outcome = Some(outcome);
        self.out_events.push(Event::SequenceFinished { outcome });
        log::debug!("sequence finished with {outcome:?}");
        Flow::to(steps::FINISHED)
    }
}
