//! Integration of every moving entity other than the player.

use last_bus_core::{
    metrics::{BLOCK_SIZE, FALL_LIMIT_Y, GROUND_Y},
    Event, GameData, ObjectKind, PhysicsParams, SlotId, SoundId,
};
use last_bus_world::{MovingPeel, Obj, ParticleKind, PeelFlight, World};

/// Gravity applied to peels and debris.
pub(crate) const DEBRIS_GRAVITY: f32 = 900.0;

/// Velocity of the peel a passing car throws.
const THROWN_PEEL_VX: f32 = -120.0;
const THROWN_PEEL_VY: f32 = -240.0;

/// Height above the street the car throws its peel from.
const CAR_THROW_HEIGHT: f32 = 40.0;

/// Distance past the view edges at which passers-by and peels despawn.
const OFFSCREEN_MARGIN: f32 = 96.0;
const HEN_MARGIN: f32 = 48.0;

const WATER_PARTICLES: usize = 4;

pub(crate) fn advance(
    world: &mut World,
    params: &PhysicsParams,
    data: &GameData,
    dt: f32,
    out_events: &mut Vec<Event>,
) {
    rope_release(world, dt);
    bus(world, dt);
    moving_peels(world, dt);
    geysers(world, data, dt);
    pushed_crates(world, params, dt);
    car(world, dt, out_events);
    hen(world, dt);
    particles(world, dt);
}

fn rope_release(world: &mut World, dt: f32) {
    let Some(mut release) = world.rope_release().copied() else {
        return;
    };
    release.remaining -= dt;
    *world.rope_release_mut() = (release.remaining > 0.0).then_some(release);
}

fn bus(world: &mut World, dt: f32) {
    let bus = world.bus_mut();
    bus.vx = (bus.vx + bus.ax * dt).clamp(-bus.max_speed, bus.max_speed);
    bus.x += bus.vx * dt;
}

fn over_hole(world: &World, x: f32) -> bool {
    world.holes().iter().any(|(_, hole)| hole.spans(x))
}

fn moving_peels(world: &mut World, dt: f32) {
    let camera = *world.camera();
    let peels: Vec<(SlotId, MovingPeel)> = world
        .moving_peels()
        .iter()
        .map(|(id, peel)| (id, *peel))
        .collect();

    for (id, mut peel) in peels {
        let Some(mut obj) = world.objects().get(peel.obj).copied() else {
            let _ = world.moving_peels_mut().remove(id);
            continue;
        };
        peel.vy += peel.gravity * dt;
        obj.x += peel.vx * dt;
        obj.y += peel.vy * dt;

        let offscreen = obj.x < camera.x - OFFSCREEN_MARGIN
            || obj.x > camera.right() + OFFSCREEN_MARGIN
            || obj.y > FALL_LIMIT_Y;
        let landed = peel.flight == PeelFlight::Thrown
            && peel.vy > 0.0
            && obj.y >= GROUND_Y
            && obj.y < GROUND_Y + BLOCK_SIZE
            && !over_hole(world, obj.x);

        if landed {
            obj.y = GROUND_Y;
            let _ = world.moving_peels_mut().remove(id);
            let _ = world.objects_mut().replace(peel.obj, obj);
        } else if offscreen {
            let _ = world.moving_peels_mut().remove(id);
            let _ = world.objects_mut().remove(peel.obj);
        } else {
            let _ = world.moving_peels_mut().replace(id, peel);
            let _ = world.objects_mut().replace(peel.obj, obj);
        }
    }
}

fn geysers(world: &mut World, data: &GameData, dt: f32) {
    let ids: Vec<SlotId> = world.geysers().iter().map(|(id, _)| id).collect();
    for id in ids {
        let Some(mut geyser) = world.geysers().get(id).copied() else {
            continue;
        };
        let Some(pattern) = data.geyser_pattern(geyser.pattern) else {
            continue;
        };
        geyser.top += geyser.velocity * dt;
        let finished = if geyser.velocity < 0.0 {
            geyser.top <= geyser.destination
        } else {
            geyser.top >= geyser.destination
        };
        let mut burst = None;
        if finished && !pattern.is_empty() {
            geyser.top = geyser.destination;
            geyser.step = (geyser.step + 1) % pattern.len();
            let leg = pattern[geyser.step];
            geyser.velocity = leg.velocity;
            geyser.destination = GROUND_Y - leg.height;
            if leg.velocity < 0.0 {
                burst = world.objects().get(geyser.obj).map(|obj| obj.x);
            }
        }
        let _ = world.geysers_mut().replace(id, geyser);
        if let Some(x) = burst {
            world.emit_particles(ParticleKind::Water, x, geyser.top, WATER_PARTICLES);
        }
    }
}

fn pushed_crates(world: &mut World, params: &PhysicsParams, dt: f32) {
    let crates: Vec<_> = world
        .pushable_crates()
        .iter()
        .filter(|(_, pushable)| pushable.pushed && pushable.left < pushable.max_left)
        .map(|(id, pushable)| (id, *pushable))
        .collect();

    for (id, mut pushable) in crates {
        let dx = (params.crate_slide_speed * dt).min(pushable.max_left - pushable.left);
        pushable.left += dx;
        if let Some(solid) = world.solids_mut().get_mut(pushable.solid) {
            solid.rect = solid.rect.translated(dx, 0.0);
        }
        if let Some(obj) = world.objects_mut().get_mut(pushable.obj) {
            obj.x = pushable.left + BLOCK_SIZE / 2.0;
        }
        let _ = world.pushable_crates_mut().replace(id, pushable);
    }
}

fn car(world: &mut World, dt: f32, out_events: &mut Vec<Event>) {
    let right = world.camera().right();
    let Some(mut car) = world.car().copied() else {
        return;
    };
    car.x += car.vx * dt;

    if !car.thrown && car.x >= car.throw_x {
        car.thrown = true;
        throw_peel(world, car.x, car.y - CAR_THROW_HEIGHT);
        out_events.push(Event::SoundRequested {
            sound: SoundId::CarHorn,
        });
    }

    *world.car_mut() = if car.x > right + OFFSCREEN_MARGIN {
        log::trace!("car left the view");
        None
    } else {
        Some(car)
    };
}

/// Spawns a thrown peel into the slots the loader held back for it.
fn throw_peel(world: &mut World, x: f32, y: f32) {
    let obj = world.objects_mut().insert(Obj::new(ObjectKind::Peel, x, y));
    debug_assert!(obj.is_ok(), "object slots were reserved at load");
    let Ok(obj) = obj else {
        return;
    };
    let peel = world.moving_peels_mut().insert(MovingPeel {
        obj,
        vx: THROWN_PEEL_VX,
        vy: THROWN_PEEL_VY,
        gravity: DEBRIS_GRAVITY,
        flight: PeelFlight::Thrown,
    });
    debug_assert!(peel.is_ok(), "peel slots were reserved at load");
    if peel.is_err() {
        let _ = world.objects_mut().remove(obj);
    }
}

fn hen(world: &mut World, dt: f32) {
    let left = world.camera().x;
    let Some(mut hen) = world.hen().copied() else {
        return;
    };
    hen.vx = (hen.vx + hen.ax * dt).clamp(-hen.max_speed, hen.max_speed);
    hen.x += hen.vx * dt;
    *world.hen_mut() = (hen.x >= left - HEN_MARGIN).then_some(hen);
}

fn particles(world: &mut World, dt: f32) {
    world.particles_mut().retain(|_, particle| {
        particle.vy += DEBRIS_GRAVITY * dt;
        particle.x += particle.vx * dt;
        particle.y += particle.vy * dt;
        particle.life -= dt;
        particle.life > 0.0
    });
}
