#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Animation ticker that advances sprite frames and expires timed effects.

use last_bus_core::{elapsed, Event, ObjectKind, PhysicsParams, PlayerState};
use last_bus_world::{AnimationKind, Player, PlayerAnimation, World};

/// Frames in the walk cycle.
pub const WALK_FRAMES: u8 = 4;

/// Distance walked per walk frame, so the cycle speeds up with the player.
const WALK_STRIDE: f32 = 12.0;

/// Slowest horizontal speed drawn as walking.
const WALK_THRESHOLD: f32 = 1.0;

/// Frame count and frame duration of each actor role.
fn cycle(kind: AnimationKind) -> (u8, f32) {
    match kind {
        AnimationKind::SpringHit { .. } => (3, 0.08),
        AnimationKind::Flagman => (2, 0.25),
        AnimationKind::JamCar => (2, 0.15),
        AnimationKind::Driver => (3, 0.2),
    }
}

/// Advances player poses, spark lifetimes and actor animations.
#[derive(Debug, Default)]
pub struct Animation;

impl Animation {
    /// Ticks every animation by the time reported in `events`.
    pub fn handle(&mut self, events: &[Event], world: &mut World, params: &PhysicsParams) {
        let Some(dt) = elapsed(events) else {
            return;
        };
        let dt = dt.as_secs_f32().min(params.max_frame_dt);

        player(world.player_mut(), dt);
        sparks(world, dt);
        actors(world, dt);
    }
}

/// Pose matching the player's state and motion.
#[must_use]
pub fn pose(player: &Player) -> PlayerAnimation {
    match player.state {
        PlayerState::Slip => PlayerAnimation::Slip,
        PlayerState::GetUp => PlayerAnimation::GetUp,
        PlayerState::ThrowBack => PlayerAnimation::ThrownBack,
        PlayerState::GrabRope => PlayerAnimation::Hang,
        PlayerState::Inactive => player.animation,
        PlayerState::Normal | PlayerState::Flicker => {
            if !player.on_floor {
                if player.vy < 0.0 {
                    PlayerAnimation::Jump
                } else {
                    PlayerAnimation::Fall
                }
            } else if player.vx.abs() > WALK_THRESHOLD {
                PlayerAnimation::Walk
            } else {
                PlayerAnimation::Stand
            }
        }
    }
}

fn player(player: &mut Player, dt: f32) {
    let next = pose(player);
    if next != player.animation {
        player.animation = next;
        player.frame = 0;
        player.frame_timer = 0.0;
        return;
    }
    if next != PlayerAnimation::Walk {
        return;
    }

    let frame_time = WALK_STRIDE / player.vx.abs();
    player.frame_timer += dt;
    while player.frame_timer >= frame_time {
        player.frame_timer -= frame_time;
        player.frame = (player.frame + 1) % WALK_FRAMES;
    }
}

fn sparks(world: &mut World, dt: f32) {
    world.objects_mut().retain(|id, obj| {
        if obj.kind != ObjectKind::Spark {
            return true;
        }
        obj.timer -= dt;
        let alive = obj.timer > 0.0;
        if !alive {
            log::trace!("spark {} burnt out", id.get());
        }
        alive
    });
}

fn actors(world: &mut World, dt: f32) {
    world.animations_mut().retain(|_, animation| {
        if let Some(remaining) = animation.remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                return false;
            }
        }
        animation.x += animation.vx * dt;

        let (frames, frame_time) = cycle(animation.kind);
        animation.frame_timer += dt;
        while animation.frame_timer >= frame_time {
            animation.frame_timer -= frame_time;
            animation.frame = (animation.frame + 1) % frames;
        }
        true
    });
}
