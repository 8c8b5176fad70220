//! Post-load synthesis of pixel geometry from a validated blueprint.

use last_bus_core::{
    metrics::{
        capacity, BLOCK_SIZE, FLOOR_THICKNESS, GROUND_Y, PASSAGE_FLOOR_Y, ROPE_BOTTOM_Y,
        ROPE_TOP_Y, TILE_SIZE,
    },
    HoleKind, ObjectKind, PlayerState, Rect, SlotId, SolidKind, TriggerPayload,
};
use last_bus_world::{
    CrateBlock, Hole, LevelInfo, Obj, PoolFull, PushableCrate, RespawnPoint, Solid, Trigger, World,
};

use crate::{
    error::{InvalidLevel, InvalidReason},
    layout::{Blueprint, HolePlan, Placement},
    LevelContext,
};

const COIN_SIZE: f32 = TILE_SIZE;

/// Left end of the street slab; the walk-in starts off screen on solid ground.
const STREET_LEFT: f32 = -2.0 * BLOCK_SIZE;

/// Converts a level-block coordinate to pixels.
pub(crate) fn px(blocks: u32) -> f32 {
    blocks as f32 * BLOCK_SIZE
}

fn centre(blocks: u32) -> f32 {
    px(blocks) + BLOCK_SIZE / 2.0
}

fn capacity_error(error: PoolFull) -> InvalidLevel {
    InvalidLevel::whole(InvalidReason::Capacity(error))
}

pub(crate) fn build(blueprint: &Blueprint, context: &LevelContext<'_>) -> Result<World, InvalidLevel> {
    let width = px(blueprint.level_blocks());
    let profile = context.data.difficulty(context.difficulty);
    let info = LevelInfo {
        number: context.number,
        difficulty: context.difficulty,
        size: blueprint.size,
        width,
        sky: blueprint.sky,
        music: blueprint.music,
        time_limit: blueprint.size as f32 * profile.seconds_per_section,
    };
    let mut world = World::new(info);
    let _ = world
        .player_mut()
        .transition(PlayerState::Normal, context.params);

    street(&mut world, blueprint, width)?;
    for hole in &blueprint.holes {
        if hole.passageway {
            passageway(&mut world, hole, context)?;
        } else {
            let _ = world
                .holes_mut()
                .insert(Hole {
                    kind: HoleKind::Deep,
                    x: px(hole.x),
                    width: px(hole.width),
                })
                .map_err(capacity_error)?;
        }
    }

    for plan in &blueprint.crates {
        let rect = Rect::new(
            px(plan.x),
            GROUND_Y - px(plan.height),
            px(plan.x + plan.width),
            GROUND_Y,
        );
        let solid = insert_solid(&mut world, SolidKind::Full, rect)?;
        let _ = world
            .crate_blocks_mut()
            .insert(CrateBlock { rect, solid })
            .map_err(capacity_error)?;
    }

    for placement in &blueprint.placements {
        place(&mut world, placement, context)?;
    }

    for &respawn in &blueprint.respawns {
        let _ = world
            .respawn_points_mut()
            .insert(RespawnPoint { x: px(respawn) })
            .map_err(capacity_error)?;
    }

    for trigger in &blueprint.triggers {
        let _ = world
            .triggers_mut()
            .insert(Trigger {
                x: px(trigger.x),
                payload: trigger.payload,
            })
            .map_err(capacity_error)?;
    }

    reserve_runtime_slots(&world, blueprint)?;
    Ok(world)
}

/// Lays the street slab, split around each hole.
fn street(world: &mut World, blueprint: &Blueprint, width: f32) -> Result<(), InvalidLevel> {
    let mut gaps: Vec<(f32, f32)> = blueprint
        .holes
        .iter()
        .map(|hole| (px(hole.x), px(hole.x + hole.width)))
        .collect();
    gaps.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut left = STREET_LEFT;
    for (gap_left, gap_right) in gaps.into_iter().chain([(width, width)]) {
        if gap_left > left {
            let rect = Rect::new(left, GROUND_Y, gap_left, GROUND_Y + FLOOR_THICKNESS);
            let _ = insert_solid(world, SolidKind::Full, rect)?;
        }
        left = gap_right;
    }
    Ok(())
}

/// Left edge a pushed crate slides to: one block on, or clear of the exit lid
/// when that block is the lid itself.
fn crate_rest(left: f32, right: f32) -> f32 {
    let next = left + BLOCK_SIZE;
    if next + BLOCK_SIZE <= right - BLOCK_SIZE {
        next
    } else {
        right
    }
}

/// Builds the lids, corridor, walls, crate and spring of a passageway.
fn passageway(
    world: &mut World,
    plan: &HolePlan,
    context: &LevelContext<'_>,
) -> Result<(), InvalidLevel> {
    let left = px(plan.x);
    let right = px(plan.x + plan.width);
    let slab_bottom = GROUND_Y + FLOOR_THICKNESS;
    let corridor_bottom = PASSAGE_FLOOR_Y + FLOOR_THICKNESS;

    let hole = world
        .holes_mut()
        .insert(Hole {
            kind: HoleKind::PassagewayClosed,
            x: left,
            width: right - left,
        })
        .map_err(capacity_error)?;

    let _ = insert_solid(
        world,
        SolidKind::PassagewayEntry,
        Rect::new(left, GROUND_Y, left + BLOCK_SIZE, slab_bottom),
    )?;
    let _ = insert_solid(
        world,
        SolidKind::PassagewayExit,
        Rect::new(right - BLOCK_SIZE, GROUND_Y, right, slab_bottom),
    )?;
    if plan.width > 2 {
        let _ = insert_solid(
            world,
            SolidKind::Full,
            Rect::new(left + BLOCK_SIZE, GROUND_Y, right - BLOCK_SIZE, slab_bottom),
        )?;
    }
    let _ = insert_solid(
        world,
        SolidKind::Full,
        Rect::new(left, PASSAGE_FLOOR_Y, right, corridor_bottom),
    )?;
    let _ = insert_solid(
        world,
        SolidKind::Full,
        Rect::new(left - BLOCK_SIZE, slab_bottom, left, corridor_bottom),
    )?;
    let _ = insert_solid(
        world,
        SolidKind::Full,
        Rect::new(right, slab_bottom, right + BLOCK_SIZE, corridor_bottom),
    )?;

    let crate_rect = Rect::new(left, GROUND_Y - BLOCK_SIZE, left + BLOCK_SIZE, GROUND_Y);
    let solid = insert_solid(world, SolidKind::Full, crate_rect)?;
    let obj = insert_obj(world, Obj::new(ObjectKind::Crate, centre(plan.x), GROUND_Y))?;
    let _ = world
        .pushable_crates_mut()
        .insert(PushableCrate {
            obj,
            solid,
            hole,
            push_remaining: context.params.push_duration,
            pushed: false,
            left,
            max_left: crate_rest(left, right),
        })
        .map_err(capacity_error)?;

    let _ = insert_obj(
        world,
        Obj::new(ObjectKind::Spring, right - BLOCK_SIZE / 2.0, PASSAGE_FLOOR_Y),
    )?;
    Ok(())
}

fn place(
    world: &mut World,
    placement: &Placement,
    context: &LevelContext<'_>,
) -> Result<(), InvalidLevel> {
    match *placement {
        Placement::Coin { kind, x, height } => {
            let y = GROUND_Y - BLOCK_SIZE / 2.0 + COIN_SIZE / 2.0 - px(height);
            let _ = insert_obj(world, Obj::new(kind, centre(x), y))?;
        }
        Placement::Peel { x } => {
            let _ = insert_obj(world, Obj::new(ObjectKind::Peel, centre(x), GROUND_Y))?;
        }
        Placement::Crack { x, pattern } => {
            let mut crack = Obj::new(ObjectKind::GeyserCrack, centre(x), GROUND_Y);
            crack.pattern = pattern;
            let _ = insert_obj(world, crack)?;
        }
        Placement::Rope { x } => {
            let _ = insert_obj(world, Obj::new(ObjectKind::RopeHorizontal, centre(x), ROPE_TOP_Y))?;
            let _ = insert_obj(world, Obj::new(ObjectKind::RopeVertical, centre(x), ROPE_BOTTOM_Y))?;
        }
        Placement::Spring { x } => {
            let _ = insert_obj(world, Obj::new(ObjectKind::Spring, centre(x), GROUND_Y))?;
        }
        Placement::Obstacle { kind, x } => {
            let left = px(x);
            let Some(template) = context.data.obstacle(kind) else {
                let _ = insert_obj(world, Obj::new(kind, centre(x), GROUND_Y))?;
                return Ok(());
            };
            let footprint = px(template.width_blocks);
            let _ = insert_obj(world, Obj::new(kind, left + footprint / 2.0, GROUND_Y))?;
            for solid in template.solids {
                let rect = Rect::new(
                    left + solid.left,
                    GROUND_Y + solid.top,
                    left + solid.right,
                    GROUND_Y + solid.bottom,
                );
                let _ = insert_solid(world, solid.kind, rect)?;
            }
        }
    }
    Ok(())
}

/// Fails the load when runtime spawns could overflow a pool.
fn reserve_runtime_slots(world: &World, blueprint: &Blueprint) -> Result<(), InvalidLevel> {
    let car_triggers = blueprint
        .triggers
        .iter()
        .filter(|trigger| matches!(trigger.payload, TriggerPayload::Car(_)))
        .count();
    let count = |kind: ObjectKind| {
        world
            .objects()
            .iter()
            .filter(|(_, obj)| obj.kind == kind)
            .count()
    };

    let objects_needed = car_triggers + capacity::SCRIPTED_OBJECTS;
    if world.objects().remaining() < objects_needed {
        return Err(capacity_error(PoolFull {
            pool: world.objects().name(),
            capacity: world.objects().capacity(),
        }));
    }

    let peels = count(ObjectKind::Peel) + car_triggers + capacity::SCRIPTED_OBJECTS;
    if peels > world.moving_peels().capacity() {
        return Err(capacity_error(PoolFull {
            pool: world.moving_peels().name(),
            capacity: world.moving_peels().capacity(),
        }));
    }

    if count(ObjectKind::GeyserCrack) > world.geysers().capacity() {
        return Err(capacity_error(PoolFull {
            pool: world.geysers().name(),
            capacity: world.geysers().capacity(),
        }));
    }

    if count(ObjectKind::Spring) > capacity::SPRINGS {
        return Err(capacity_error(PoolFull {
            pool: "springs",
            capacity: capacity::SPRINGS,
        }));
    }
    Ok(())
}

fn insert_solid(world: &mut World, kind: SolidKind, rect: Rect) -> Result<SlotId, InvalidLevel> {
    world
        .solids_mut()
        .insert(Solid { rect, kind })
        .map_err(capacity_error)
}

fn insert_obj(world: &mut World, obj: Obj) -> Result<SlotId, InvalidLevel> {
    world.objects_mut().insert(obj).map_err(capacity_error)
}
