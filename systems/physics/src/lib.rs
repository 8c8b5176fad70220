#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Physics system that integrates every moving entity and resolves the
//! player against the level's static solids.

use last_bus_core::{elapsed, Actions, Event, GameData, PhysicsParams};
use last_bus_world::{query, World};

mod camera;
pub mod collision;
mod motion;
mod passageway;
mod player;

/// Frame-stepped integrator for the player, passers-by, debris and camera.
#[derive(Debug, Default)]
pub struct Physics;

impl Physics {
    /// Advances the world by the time reported in `events`.
    ///
    /// `held` is ignored while the sequence owns input; its scripted actions
    /// steer the player instead.
    pub fn handle(
        &mut self,
        events: &[Event],
        world: &mut World,
        held: Actions,
        params: &PhysicsParams,
        data: &GameData,
        out_events: &mut Vec<Event>,
    ) {
        let Some(dt) = elapsed(events) else {
            return;
        };
        let dt = dt.as_secs_f32().min(params.max_frame_dt);

        let actions = query::effective_actions(world, held);
        player::step(world, actions, params, dt, out_events);
        passageway::detect(world, params, out_events);
        motion::advance(world, params, data, dt, out_events);
        camera::follow(world, params, dt);
    }
}
