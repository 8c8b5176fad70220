//! Final-level ending: the bus leaves with the player, a flagman waves it
//! down and a traffic jam closes in behind it.

use last_bus_core::{metrics::GROUND_Y, steps, Actions, Event, MusicId, Outcome, SoundId};
use last_bus_world::{Animation, AnimationKind};

use crate::{Flow, Scene, BOARD_DELAY};

const DEPART_DELAY: f32 = 0.6;
const FLAGMAN_DELAY: f32 = 0.6;
const FLAGMAN_SPEED: f32 = 60.0;
const FLAGMAN_MARGIN: f32 = 24.0;
const BUS_BRAKE: f32 = 480.0;

const JAM_CARS: usize = 3;
const JAM_SPACING: f32 = 120.0;
const JAM_MARGIN: f32 = 96.0;
const JAM_SPEED: f32 = 180.0;
/// Time the jam cars drive before settling behind the bus.
const JAM_DRIVE: f32 = 1.5;

const BEAT: f32 = 1.0;
const MUSIC_HOLD: f32 = 2.0;
const WALK_OFF: f32 = 1.5;

pub(crate) fn step(offset: u16, scene: &mut Scene<'_>) -> Flow {
    let next = |offset: u16| steps::ENDING + offset;
    match offset {
        0 => {
            scene.script(Actions::RIGHT);
            Flow::to(next(1))
        }
        1 => {
            if !scene.at_door() {
                return Flow::Wait;
            }
            scene.board();
            Flow::after(next(2), BOARD_DELAY)
        }
        2 => {
            scene.close_door();
            scene.drive_off();
            scene.world.camera_mut().follow = false;
            Flow::after(next(3), DEPART_DELAY)
        }
        3 => {
            let camera = *scene.world.camera();
            let mut flagman = Animation::new(
                AnimationKind::Flagman,
                camera.right() + FLAGMAN_MARGIN,
                GROUND_Y,
                None,
            );
            flagman.vx = -FLAGMAN_SPEED;
            scene.spawn_actor(flagman);
            scene.sound(SoundId::Whistle);
            Flow::after(next(4), FLAGMAN_DELAY)
        }
        4 => {
            scene.world.bus_mut().ax = -BUS_BRAKE;
            Flow::to(next(5))
        }
        5 => {
            if scene.bus().vx > 0.0 {
                return Flow::Wait;
            }
            scene.halt_bus();
            scene.pace_actors(AnimationKind::Flagman, 0.0);
            Flow::after(next(6), BOARD_DELAY)
        }
        6 => {
            let camera_x = scene.world.camera().x;
            for index in 0..JAM_CARS {
                let mut car = Animation::new(
                    AnimationKind::JamCar,
                    camera_x - JAM_MARGIN - index as f32 * JAM_SPACING,
                    GROUND_Y,
                    None,
                );
                car.vx = JAM_SPEED;
                scene.spawn_actor(car);
            }
            Flow::after(next(7), JAM_DRIVE)
        }
        7 => {
            scene.pace_actors(AnimationKind::JamCar, 0.0);
            scene.sound(SoundId::CarHorn);
            Flow::after(next(8), BEAT)
        }
        8 => {
            scene.sound(SoundId::Whistle);
            Flow::after(next(9), BEAT)
        }
        9 => {
            scene.music(MusicId::Ending);
            Flow::after(next(10), MUSIC_HOLD)
        }
        10 => {
            scene.pace_actors(AnimationKind::Flagman, FLAGMAN_SPEED);
            Flow::after(next(11), WALK_OFF)
        }
        11 => {
            scene.out_events.push(Event::EffectsStopped);
            Flow::after(next(12), BEAT)
        }
        12 => scene.finish(Outcome::Ending),
        _ => Flow::Unknown,
    }
}
