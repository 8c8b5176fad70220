//! Boarding scenes played once the player reaches the bus.

use last_bus_core::{metrics::GROUND_Y, steps, Actions, ObjectKind, PlayerState, SoundId};
use last_bus_world::{Animation, AnimationKind, MovingPeel, Obj, PeelFlight};

use crate::{Flow, Scene, BOARD_DELAY, DRIVER_THROW_REACH};

const DOOR_PAUSE: f32 = 0.2;

const DOOR_SLAM_DELAY: f32 = 0.3;
/// Distance the bus creeps forward after slamming its door.
const CREEP_DISTANCE: f32 = 96.0;
const CREEP_SPEED: f32 = 120.0;

/// Height above the street the driver throws from.
const DRIVER_HAND_HEIGHT: f32 = 40.0;
const DRIVER_PEEL_VX: f32 = -30.0;
const DRIVER_PEEL_VY: f32 = -240.0;
const DRIVER_PEEL_GRAVITY: f32 = 900.0;
const DRIVER_ANIMATION: f32 = 0.6;
/// Pause after the throw so the peel lands before the player moves on.
const THROW_SETTLE: f32 = 0.8;

/// The player walks to the door and gets on.
pub(crate) fn plain(offset: u16, scene: &mut Scene<'_>) -> Flow {
    match offset {
        0 => {
            scene.script(Actions::RIGHT);
            Flow::to(steps::GOAL_PLAIN + 1)
        }
        1 => {
            if !scene.at_door() {
                return Flow::Wait;
            }
            scene.script(Actions::empty());
            Flow::after(steps::GOAL_PLAIN + 2, DOOR_PAUSE)
        }
        2 => {
            scene.board();
            Flow::after(steps::BUS_LEAVING, BOARD_DELAY)
        }
        _ => Flow::Unknown,
    }
}

/// The door slams shut, the bus creeps forward and reopens.
pub(crate) fn door_slam(offset: u16, scene: &mut Scene<'_>) -> Flow {
    match offset {
        0 => {
            scene.close_door();
            Flow::after(steps::GOAL_DOOR_SLAM + 1, DOOR_SLAM_DELAY)
        }
        1 => {
            let bus = scene.world.bus_mut();
            bus.stop_x = bus.x + CREEP_DISTANCE;
            bus.vx = CREEP_SPEED;
            bus.ax = 0.0;
            bus.max_speed = CREEP_SPEED;
            scene.sound(SoundId::BusEngine);
            Flow::to(steps::GOAL_DOOR_SLAM + 2)
        }
        2 => {
            let bus = scene.bus();
            if bus.x < bus.stop_x {
                return Flow::Wait;
            }
            scene.halt_bus();
            scene.world.bus_mut().x = bus.stop_x;
            scene.open_door();
            Flow::after(steps::GOAL_DOOR_SLAM + 3, DOOR_SLAM_DELAY)
        }
        3 => {
            scene.script(Actions::RIGHT);
            Flow::to(steps::GOAL_DOOR_SLAM + 4)
        }
        4 => {
            if !scene.at_door() {
                return Flow::Wait;
            }
            scene.board();
            Flow::after(steps::BUS_LEAVING, BOARD_DELAY)
        }
        _ => Flow::Unknown,
    }
}

/// The driver throws a peel in the player's path; the player slips, gets up
/// and boards.
pub(crate) fn peel_throw(offset: u16, scene: &mut Scene<'_>) -> Flow {
    match offset {
        0 => {
            scene.script(Actions::RIGHT);
            Flow::to(steps::GOAL_PEEL_THROW + 1)
        }
        1 => {
            if scene.player().x <= scene.bus().x + DRIVER_THROW_REACH {
                return Flow::Wait;
            }
            scene.script(Actions::empty());
            throw_peel(scene);
            Flow::after(steps::GOAL_PEEL_THROW + 2, THROW_SETTLE)
        }
        2 => {
            scene.script(Actions::RIGHT);
            Flow::to(steps::GOAL_PEEL_THROW + 3)
        }
        3 => {
            if scene.player().state == PlayerState::Slip {
                scene.script(Actions::empty());
                Flow::to(steps::GOAL_PEEL_THROW + 4)
            } else if scene.at_door() {
                // The peel missed; board anyway.
                scene.board();
                Flow::after(steps::BUS_LEAVING, BOARD_DELAY)
            } else {
                Flow::Wait
            }
        }
        4 => {
            if scene.player().state != PlayerState::Normal {
                return Flow::Wait;
            }
            scene.script(Actions::RIGHT);
            Flow::to(steps::GOAL_PEEL_THROW + 5)
        }
        5 => {
            if !scene.at_door() {
                return Flow::Wait;
            }
            scene.board();
            Flow::after(steps::BUS_LEAVING, BOARD_DELAY)
        }
        _ => Flow::Unknown,
    }
}

fn throw_peel(scene: &mut Scene<'_>) {
    let door_x = scene.bus().door_x();
    scene.spawn_actor(Animation::new(
        AnimationKind::Driver,
        door_x,
        GROUND_Y,
        Some(DRIVER_ANIMATION),
    ));

    let peel = Obj::new(ObjectKind::Peel, door_x, GROUND_Y - DRIVER_HAND_HEIGHT);
    let thrown = scene.world.objects_mut().insert(peel);
    debug_assert!(thrown.is_ok(), "an object slot was reserved for the driver's peel");
    if let Ok(obj) = thrown {
        let flight = scene.world.moving_peels_mut().insert(MovingPeel {
            obj,
            vx: DRIVER_PEEL_VX,
            vy: DRIVER_PEEL_VY,
            gravity: DRIVER_PEEL_GRAVITY,
            flight: PeelFlight::Thrown,
        });
        debug_assert!(flight.is_ok(), "a peel slot was reserved for the driver's peel");
        if flight.is_err() {
            let _ = scene.world.objects_mut().remove(obj);
        }
    }
}
