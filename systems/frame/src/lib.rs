#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame pipeline that runs every system over the world in a fixed order.
//!
//! One call to [`Frame::step`] clamps the frame delta, ticks the world clock
//! and then runs physics, interaction, the sequence machine and the
//! animation ticker against the resulting `TimeAdvanced` event.

use std::time::Duration;

use last_bus_core::{Actions, Command, Event, GameData, PhysicsParams};
use last_bus_system_animation::Animation;
use last_bus_system_interaction::Interaction;
use last_bus_system_physics::Physics;
use last_bus_system_sequence::Sequence;
use last_bus_world::{self as world, query, World};

/// Owns the frame systems and the tuning they share.
#[derive(Debug)]
pub struct Frame {
    physics: Physics,
    interaction: Interaction,
    sequence: Sequence,
    animation: Animation,
    params: PhysicsParams,
    data: &'static GameData,
}

impl Frame {
    /// Creates a pipeline using the standard game tables.
    #[must_use]
    pub fn new(params: PhysicsParams) -> Self {
        Self::with_data(params, GameData::standard())
    }

    /// Creates a pipeline using the provided game tables.
    #[must_use]
    pub fn with_data(params: PhysicsParams, data: &'static GameData) -> Self {
        Self {
            physics: Physics,
            interaction: Interaction,
            sequence: Sequence,
            animation: Animation,
            params,
            data,
        }
    }

    /// Tuning shared by the systems.
    #[must_use]
    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Advances the world by one frame of `dt` with the actions held by the
    /// player.
    ///
    /// Every event raised during the frame, starting with the clock tick, is
    /// appended to `out_events`.
    pub fn step(
        &mut self,
        world: &mut World,
        dt: Duration,
        held: Actions,
        out_events: &mut Vec<Event>,
    ) {
        let dt = world::clamp_frame_dt(dt, self.params.max_frame_dt);
        let mut tick_events = Vec::new();
        world::apply(world, Command::Tick { dt }, &mut tick_events);

        let mut raised = Vec::new();
        self.physics.handle(
            &tick_events,
            world,
            held,
            &self.params,
            self.data,
            &mut raised,
        );
        let actions = query::effective_actions(world, held);
        self.interaction.handle(
            &tick_events,
            world,
            actions,
            &self.params,
            self.data,
            &mut raised,
        );
        self.sequence.handle(
            &tick_events,
            world,
            &self.params,
            self.data,
            &mut raised,
        );
        self.animation.handle(&tick_events, world, &self.params);

        if !raised.is_empty() {
            log::trace!(
                "frame {} raised {} events",
                world.tick_index(),
                raised.len()
            );
        }
        out_events.extend(tick_events);
        out_events.extend(raised);
    }
}
