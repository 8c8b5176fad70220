#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Interaction system that resolves the player's contacts with level objects.
//!
//! Runs after physics each frame. Every active object is tested against the
//! player with a type-specific box and its effect applies at most once per
//! frame.

use last_bus_core::{
    elapsed,
    metrics::{BLOCK_SIZE, GROUND_Y, ROPE_BOTTOM_Y, ROPE_TOP_Y},
    Actions, Event, GameData, ObjectKind, PhysicsParams, PlayerState, Rect, SlotId, SoundId,
    TriggerPayload,
};
use last_bus_world::{
    Animation, AnimationKind, Car, Geyser, GrabbedRope, Hen, MovingPeel, Obj, ParticleKind,
    PeelFlight, RopeRelease, World,
};

mod boxes;

pub use boxes::contact_box;

/// Lifetime of the spark a collected coin leaves behind.
pub const SPARK_DURATION: f32 = 0.3;

/// Lifetime of a spring's hit animation.
pub const SPRING_HIT_DURATION: f32 = 0.25;

const SLIP_PEEL_VX: f32 = 90.0;
const SLIP_PEEL_VY: f32 = -300.0;
const PEEL_GRAVITY: f32 = 900.0;

const CAR_SPEED: f32 = 420.0;
/// Distance past its trigger at which a car throws its peel.
const CAR_THROW_OFFSET: f32 = 4.0 * BLOCK_SIZE + 96.0;
const CAR_ENTRY_MARGIN: f32 = 96.0;

const HEN_SPEED: f32 = -30.0;
const HEN_ACCEL: f32 = -360.0;
const HEN_MAX_SPEED: f32 = 300.0;
const HEN_ENTRY_MARGIN: f32 = 24.0;

const CRACK_PARTICLES: usize = 8;

/// Half width of the band around a rope that catches the player's hand.
const ROPE_REACH: f32 = 8.0;

/// Resolves coins, hazards, ropes, springs, crates and triggers.
#[derive(Debug, Default)]
pub struct Interaction;

impl Interaction {
    /// Applies every contact effect for the frame reported in `events`.
    ///
    /// `actions` are the actions steering the player this frame.
    pub fn handle(
        &mut self,
        events: &[Event],
        world: &mut World,
        actions: Actions,
        params: &PhysicsParams,
        data: &GameData,
        out_events: &mut Vec<Event>,
    ) {
        let Some(dt) = elapsed(events) else {
            return;
        };
        if world.player().state == PlayerState::Inactive {
            return;
        }
        let dt = dt.as_secs_f32().min(params.max_frame_dt);

        objects(world, params, data, out_events);
        geyser_bodies(world, params, out_events);
        crates(world, actions, params, dt, out_events);
        triggers(world, out_events);
    }
}

fn throw_back(world: &mut World, params: &PhysicsParams, out_events: &mut Vec<Event>) {
    if world.player().state == PlayerState::GrabRope {
        release_rope(world, params);
    }
    if let Some(event) = world
        .player_mut()
        .transition(PlayerState::ThrowBack, params)
    {
        out_events.push(event);
    }
    out_events.push(Event::SoundRequested {
        sound: SoundId::ThrowBack,
    });
}

fn release_rope(world: &mut World, params: &PhysicsParams) {
    if let Some(rope) = world.grabbed_rope_mut().take() {
        *world.rope_release_mut() = Some(RopeRelease {
            obj: rope.obj,
            remaining: params.rope_regrab_window,
        });
    }
}

fn objects(world: &mut World, params: &PhysicsParams, data: &GameData, out_events: &mut Vec<Event>) {
    let flying: Vec<SlotId> = world
        .moving_peels()
        .iter()
        .map(|(_, peel)| peel.obj)
        .collect();
    let snapshot: Vec<(SlotId, Obj)> = world
        .objects()
        .iter()
        .filter(|(id, _)| !flying.contains(id))
        .map(|(id, obj)| (id, *obj))
        .collect();

    for (id, obj) in snapshot {
        let player = *world.player();
        let body = player.bounding_box();
        match obj.kind {
            ObjectKind::SilverCoin | ObjectKind::GoldCoin => {
                if body.overlaps(&contact_box(&obj)) {
                    collect_coin(world, id, obj, out_events);
                }
            }
            ObjectKind::Peel => {
                if player.state == PlayerState::Normal
                    && player.on_floor
                    && body.overlaps(&contact_box(&obj))
                {
                    slip(world, id, params, out_events);
                }
            }
            ObjectKind::GeyserCrack => {
                if body.overlaps(&contact_box(&obj)) {
                    erupt(world, id, obj, params, data, out_events);
                }
            }
            ObjectKind::RopeVertical => {
                let (hand_x, hand_y) = player.hand();
                let band = Rect::new(obj.x - ROPE_REACH, ROPE_TOP_Y, obj.x + ROPE_REACH, ROPE_BOTTOM_Y);
                let refused = world
                    .rope_release()
                    .is_some_and(|release| release.obj == id);
                if player.state.is_controllable()
                    && !player.on_floor
                    && world.grabbed_rope().is_none()
                    && !refused
                    && band.contains_point(hand_x, hand_y)
                {
                    grab_rope(world, id, obj, params, out_events);
                }
            }
            ObjectKind::Spring => {
                let launchable = !matches!(
                    player.state,
                    PlayerState::Inactive | PlayerState::GrabRope
                );
                if launchable && player.vy >= 0.0 && body.overlaps(&contact_box(&obj)) {
                    spring(world, id, obj, params, out_events);
                }
            }
            ObjectKind::Crate
            | ObjectKind::Geyser
            | ObjectKind::RopeHorizontal
            | ObjectKind::Hydrant
            | ObjectKind::Sign
            | ObjectKind::ParkedCar
            | ObjectKind::ParkedVan
            | ObjectKind::Truck
            | ObjectKind::Scooter
            | ObjectKind::Spark => {}
        }
    }
}

fn collect_coin(world: &mut World, id: SlotId, obj: Obj, out_events: &mut Vec<Event>) {
    let Some(points) = obj.kind.coin_value() else {
        return;
    };
    let mut spark = Obj::new(ObjectKind::Spark, obj.x, obj.y);
    spark.timer = SPARK_DURATION;
    let _ = world.objects_mut().replace(id, spark);
    world.award(points, out_events);
    out_events.push(Event::SoundRequested {
        sound: SoundId::Coin,
    });
}

fn slip(world: &mut World, id: SlotId, params: &PhysicsParams, out_events: &mut Vec<Event>) {
    let forward = if world.player().facing_left { -1.0 } else { 1.0 };
    let kicked = world.moving_peels_mut().insert(MovingPeel {
        obj: id,
        vx: forward * SLIP_PEEL_VX,
        vy: SLIP_PEEL_VY,
        gravity: PEEL_GRAVITY,
        flight: PeelFlight::Slipped,
    });
    debug_assert!(kicked.is_ok(), "peel slots were reserved at load");

    if let Some(event) = world.player_mut().transition(PlayerState::Slip, params) {
        out_events.push(event);
    }
    out_events.push(Event::SoundRequested {
        sound: SoundId::Slip,
    });
}

fn erupt(
    world: &mut World,
    id: SlotId,
    obj: Obj,
    params: &PhysicsParams,
    data: &GameData,
    out_events: &mut Vec<Event>,
) {
    let Some(first) = data
        .geyser_pattern(obj.pattern)
        .and_then(|pattern| pattern.first())
    else {
        return;
    };
    let geyser = world.geysers_mut().insert(Geyser {
        obj: id,
        top: GROUND_Y,
        velocity: first.velocity,
        destination: GROUND_Y - first.height,
        pattern: obj.pattern,
        step: 0,
    });
    debug_assert!(geyser.is_ok(), "geyser slots were reserved at load");
    if let Some(crack) = world.objects_mut().get_mut(id) {
        crack.kind = ObjectKind::Geyser;
    }
    world.emit_particles(ParticleKind::Crack, obj.x, GROUND_Y, CRACK_PARTICLES);
    out_events.push(Event::SoundRequested {
        sound: SoundId::Geyser,
    });

    if world.player().state == PlayerState::Normal {
        throw_back(world, params, out_events);
    }
}

fn grab_rope(
    world: &mut World,
    id: SlotId,
    obj: Obj,
    params: &PhysicsParams,
    out_events: &mut Vec<Event>,
) {
    let player = *world.player();
    let limit = params.rope_swing_limit;
    *world.grabbed_rope_mut() = Some(GrabbedRope {
        obj: id,
        anchor_x: obj.x,
        offset: (player.x - obj.x).clamp(-limit, limit),
        swing_velocity: player.vx,
    });
    if let Some(event) = world
        .player_mut()
        .transition(PlayerState::GrabRope, params)
    {
        out_events.push(event);
    }
    out_events.push(Event::SoundRequested {
        sound: SoundId::RopeGrab,
    });
}

fn spring(world: &mut World, id: SlotId, obj: Obj, params: &PhysicsParams, out_events: &mut Vec<Event>) {
    let player = world.player_mut();
    player.vy = -params.spring_speed;
    player.on_floor = false;
    out_events.push(Event::SoundRequested {
        sound: SoundId::Spring,
    });

    let kind = AnimationKind::SpringHit { spring: id };
    let running = world
        .animations()
        .iter()
        .find(|(_, animation)| animation.kind == kind)
        .map(|(slot, _)| slot);
    let animation = Animation::new(kind, obj.x, obj.y, Some(SPRING_HIT_DURATION));
    match running {
        Some(slot) => {
            let _ = world.animations_mut().replace(slot, animation);
        }
        None => {
            let started = world.animations_mut().insert(animation);
            debug_assert!(started.is_ok(), "spring animation slots were reserved at load");
        }
    }
}

fn geyser_bodies(world: &mut World, params: &PhysicsParams, out_events: &mut Vec<Event>) {
    let state = world.player().state;
    if matches!(state, PlayerState::Inactive | PlayerState::ThrowBack) {
        return;
    }
    let body = world.player().bounding_box();
    let hit = world.geysers().iter().any(|(_, geyser)| {
        world.objects().get(geyser.obj).is_some_and(|obj| {
            let column = geyser.body(obj.x);
            column.height() > 0.0 && body.overlaps(&column)
        })
    });
    if hit {
        throw_back(world, params, out_events);
    }
}

fn crates(
    world: &mut World,
    actions: Actions,
    params: &PhysicsParams,
    dt: f32,
    out_events: &mut Vec<Event>,
) {
    let reach = world.player().bounding_box().expanded(1.0);
    let pushing = actions.contains(Actions::RIGHT);
    let candidates: Vec<_> = world
        .pushable_crates()
        .iter()
        .filter(|(_, pushable)| !pushable.pushed)
        .map(|(id, pushable)| (id, *pushable))
        .collect();

    for (id, mut pushable) in candidates {
        let touching = world
            .solids()
            .get(pushable.solid)
            .is_some_and(|solid| reach.overlaps(&solid.rect));

        if pushing && touching {
            pushable.push_remaining -= dt;
            if pushable.push_remaining <= 0.0 {
                pushable.push_remaining = 0.0;
                pushable.pushed = true;
                out_events.push(Event::CratePushed { crate_slot: id });
                out_events.push(Event::SoundRequested {
                    sound: SoundId::CrateSlide,
                });
                log::debug!("crate {} starts sliding", id.get());
            }
        } else {
            pushable.push_remaining = params.push_duration;
        }
        let _ = world.pushable_crates_mut().replace(id, pushable);
    }
}

fn triggers(world: &mut World, out_events: &mut Vec<Event>) {
    let player_x = world.player().x;
    let camera = *world.camera();
    let reached: Vec<_> = world
        .triggers()
        .iter()
        .filter(|(_, trigger)| player_x >= trigger.x)
        .map(|(id, trigger)| (id, *trigger))
        .collect();

    for (id, trigger) in reached {
        let _ = world.triggers_mut().remove(id);
        match trigger.payload {
            TriggerPayload::Car(color) => {
                *world.car_mut() = Some(Car {
                    color,
                    x: camera.x - CAR_ENTRY_MARGIN,
                    y: GROUND_Y,
                    vx: CAR_SPEED,
                    throw_x: trigger.x + CAR_THROW_OFFSET,
                    thrown: false,
                });
            }
            TriggerPayload::Hen => {
                *world.hen_mut() = Some(Hen {
                    x: camera.right() + HEN_ENTRY_MARGIN,
                    y: GROUND_Y,
                    vx: HEN_SPEED,
                    ax: HEN_ACCEL,
                    max_speed: HEN_MAX_SPEED,
                });
                out_events.push(Event::SoundRequested {
                    sound: SoundId::Hen,
                });
            }
        }
        out_events.push(Event::TriggerFired {
            trigger: id,
            payload: trigger.payload,
        });
        log::debug!("trigger {} fired at x={:.0}", id.get(), trigger.x);
    }
}

