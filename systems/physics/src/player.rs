use last_bus_core::{
    metrics::{
        BLOCK_SIZE, FALL_LIMIT_Y, GROUND_Y, PLAYER_APPROACH_X, PLAYER_HAND_HEIGHT, ROPE_BOTTOM_Y,
        ROPE_TOP_Y,
    },
    Actions, Event, PhysicsParams, PlayerState, SoundId,
};
use last_bus_world::{query, Player, RopeRelease, World};

use crate::collision::{resolve_horizontal, resolve_vertical};

/// Jumping off a rope keeps this share of a regular jump.
const ROPE_JUMP_FACTOR: f32 = 0.8;

fn direction(actions: Actions) -> f32 {
    let mut dir = 0.0;
    if actions.contains(Actions::RIGHT) {
        dir += 1.0;
    }
    if actions.contains(Actions::LEFT) {
        dir -= 1.0;
    }
    dir
}

fn approach_zero(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else {
        (value + amount).min(0.0)
    }
}

fn push(out_events: &mut Vec<Event>, event: Option<Event>) {
    if let Some(event) = event {
        out_events.push(event);
    }
}

/// Advances the player one frame: timers, steering, gravity and collision.
pub(crate) fn step(
    world: &mut World,
    actions: Actions,
    params: &PhysicsParams,
    dt: f32,
    out_events: &mut Vec<Event>,
) {
    let mut player = *world.player();
    let pressed = actions.contains(Actions::JUMP) && !player.previous_actions.contains(Actions::JUMP);
    player.previous_actions = actions;

    match player.state {
        PlayerState::Inactive => {}
        PlayerState::GrabRope => swing(world, &mut player, actions, pressed, params, dt, out_events),
        _ => {
            tick_timers(&mut player, params, dt, out_events);
            steer(&mut player, actions, pressed, params, dt, out_events);
            integrate(world, &mut player, params, dt, out_events);
        }
    }

    *world.player_mut() = player;
}

fn tick_timers(player: &mut Player, params: &PhysicsParams, dt: f32, out_events: &mut Vec<Event>) {
    let next = match player.state {
        PlayerState::Slip => Some(PlayerState::GetUp),
        PlayerState::GetUp | PlayerState::Flicker => Some(PlayerState::Normal),
        _ => None,
    };
    let Some(next) = next else {
        return;
    };
    player.state_timer -= dt;
    if player.state_timer <= 0.0 {
        push(out_events, player.transition(next, params));
    }
}

fn steer(
    player: &mut Player,
    actions: Actions,
    pressed: bool,
    params: &PhysicsParams,
    dt: f32,
    out_events: &mut Vec<Event>,
) {
    if pressed {
        player.jump_buffer = params.jump_buffer;
    } else {
        player.jump_buffer = (player.jump_buffer - dt).max(0.0);
    }

    if !player.state.is_controllable() {
        if player.on_floor {
            player.vx = approach_zero(player.vx, player.decel * dt);
        }
        return;
    }

    let dir = direction(actions);
    if dir != 0.0 {
        let accel = if player.on_floor {
            player.accel
        } else {
            params.air_accel
        };
        player.vx = (player.vx + dir * accel * dt).clamp(-params.max_walk_speed, params.max_walk_speed);
        player.facing_left = dir < 0.0;
    } else if player.on_floor {
        player.vx = approach_zero(player.vx, player.decel * dt);
    }

    if player.on_floor && player.jump_buffer > 0.0 {
        player.vy = -params.jump_speed;
        player.on_floor = false;
        player.jump_buffer = 0.0;
        out_events.push(Event::SoundRequested {
            sound: SoundId::Jump,
        });
    }
}

fn integrate(
    world: &mut World,
    player: &mut Player,
    params: &PhysicsParams,
    dt: f32,
    out_events: &mut Vec<Event>,
) {
    player.vy = (player.vy + player.gravity * dt).min(params.max_fall_speed);

    let solids = || world.solids().iter().map(|(_, solid)| solid);
    let horizontal = resolve_horizontal(solids(), player, player.x + player.vx * dt);
    player.x = horizontal.x;
    if horizontal.blocked {
        player.vx = 0.0;
    }

    let vertical = resolve_vertical(solids(), player, player.y + player.vy * dt, params);
    if let Some(x) = vertical.snap_x {
        player.x = x;
    }
    player.y = vertical.y;
    let was_on_floor = player.on_floor;
    player.on_floor = vertical.landed;
    if vertical.landed || vertical.bonked {
        player.vy = 0.0;
    }

    if vertical.landed && !was_on_floor && player.state == PlayerState::ThrowBack {
        player.vx = 0.0;
        push(out_events, player.transition(PlayerState::GetUp, params));
    }

    if player.y > FALL_LIMIT_Y {
        respawn(world, player, params, out_events);
    }
}

fn swing(
    world: &mut World,
    player: &mut Player,
    actions: Actions,
    pressed: bool,
    params: &PhysicsParams,
    dt: f32,
    out_events: &mut Vec<Event>,
) {
    let Some(mut rope) = world.grabbed_rope().copied() else {
        push(out_events, player.transition(PlayerState::Normal, params));
        return;
    };

    let restoring = -params.rope_stiffness * rope.offset;
    rope.swing_velocity += (restoring + direction(actions) * params.rope_push) * dt;
    rope.offset += rope.swing_velocity * dt;
    let limit = params.rope_swing_limit;
    if rope.offset.abs() > limit {
        rope.offset = rope.offset.clamp(-limit, limit);
        rope.swing_velocity = 0.0;
    }

    player.x = rope.anchor_x + rope.offset;
    player.y = player
        .y
        .clamp(ROPE_TOP_Y + PLAYER_HAND_HEIGHT, ROPE_BOTTOM_Y + PLAYER_HAND_HEIGHT);
    player.vx = rope.swing_velocity;
    if rope.swing_velocity != 0.0 {
        player.facing_left = rope.swing_velocity < 0.0;
    }

    let let_go = actions.contains(Actions::DOWN);
    if pressed || let_go {
        player.vx = player
            .vx
            .clamp(-params.max_walk_speed, params.max_walk_speed);
        push(out_events, player.transition(PlayerState::Normal, params));
        if pressed {
            player.vy = -ROPE_JUMP_FACTOR * params.jump_speed;
            out_events.push(Event::SoundRequested {
                sound: SoundId::Jump,
            });
        }
        *world.grabbed_rope_mut() = None;
        *world.rope_release_mut() = Some(RopeRelease {
            obj: rope.obj,
            remaining: params.rope_regrab_window,
        });
        log::trace!("released rope at x={:.1}", player.x);
    } else {
        *world.grabbed_rope_mut() = Some(rope);
    }
}

/// Puts a player who fell through a deep hole back on the street.
fn respawn(world: &mut World, player: &mut Player, params: &PhysicsParams, out_events: &mut Vec<Event>) {
    let x = query::respawn_positions(world)
        .into_iter()
        .rev()
        .find(|&point| point < player.x)
        .unwrap_or(PLAYER_APPROACH_X);

    player.x = x + BLOCK_SIZE / 2.0;
    player.y = GROUND_Y;
    player.vx = 0.0;
    player.vy = 0.0;
    player.on_floor = true;
    player.passageway = None;
    player.jump_buffer = 0.0;
    push(out_events, player.transition(PlayerState::Flicker, params));

    *world.grabbed_rope_mut() = None;
    world.camera_mut().dest_y = 0.0;
    out_events.push(Event::SoundRequested {
        sound: SoundId::Fall,
    });
    out_events.push(Event::PlayerRespawned { x });
    log::debug!("player fell out, respawned at x={x:.0}");
}
