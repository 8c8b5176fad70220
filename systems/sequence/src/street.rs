//! Scenes played on the open street: the walk-in, normal play, the bus
//! leaving and the two time-up variants.

use last_bus_core::{
    metrics::{GROUND_Y, PLAYER_APPROACH_X},
    steps, Actions, Event, MusicId, Outcome, PlayerState,
};
use last_bus_world::{Bus, Player};

use crate::{goal_scenario, Flow, Scene};

const DOOR_CLOSE_DELAY: f32 = 0.4;
const TIME_UP_NEAR_DELAY: f32 = 0.5;
/// How long the far time-up scene holds before finishing.
const TIME_UP_FAR_HOLD: f32 = 2.0;

/// The player has reached the bus once standing on the street at or past
/// its rear.
fn reached_bus(player: &Player, bus: &Bus) -> bool {
    player.state != PlayerState::Inactive
        && player.on_floor
        && (player.y - GROUND_Y).abs() < 1.0
        && player.x >= bus.x
}

pub(crate) fn play(scene: &mut Scene<'_>) -> Flow {
    let player = scene.player();
    let bus = scene.bus();
    if reached_bus(&player, &bus) {
        return goal(scene);
    }

    let progress = *scene.world.progress();
    if progress.clock_running && progress.time_left <= 0.0 {
        return time_up(scene, &bus);
    }
    Flow::Wait
}

fn goal(scene: &mut Scene<'_>) -> Flow {
    let info = *scene.world.info();
    let progress = scene.world.progress_mut();
    progress.goal_reached = true;
    progress.clock_running = false;
    scene.out_events.push(Event::GoalReached);
    scene.out_events.push(Event::MusicStopped { music: info.music });
    scene.script(Actions::empty());

    let next = goal_scenario(scene.data, info.difficulty, info.number);
    log::debug!(
        "level {} reached the bus on {:?}, playing scene {next}",
        info.number,
        info.difficulty
    );
    Flow::to(next)
}

fn time_up(scene: &mut Scene<'_>, bus: &Bus) -> Flow {
    let info = *scene.world.info();
    let progress = scene.world.progress_mut();
    progress.time_up = true;
    progress.clock_running = false;
    scene.out_events.push(Event::TimeUp);
    scene.out_events.push(Event::MusicStopped { music: info.music });
    scene.music(MusicId::TimeUp);
    scene.script(Actions::empty());

    if bus.x < scene.world.camera().right() {
        Flow::to(steps::TIME_UP_NEAR)
    } else {
        Flow::to(steps::TIME_UP_FAR)
    }
}

/// The player walks in from the left while the bus pulls away from the
/// previous stop, then the bus waits at the far end of the level.
pub(crate) fn approach(offset: u16, scene: &mut Scene<'_>) -> Flow {
    match offset {
        0 => {
            scene.script(Actions::RIGHT);
            scene.drive_off();
            Flow::to(steps::APPROACH + 1)
        }
        1 => {
            if scene.player().x < PLAYER_APPROACH_X {
                return Flow::Wait;
            }
            scene.script(Actions::empty());
            Flow::to(steps::APPROACH + 2)
        }
        2 => {
            if !scene.bus_out_of_view() {
                return Flow::Wait;
            }
            scene.halt_bus();
            let bus = scene.world.bus_mut();
            bus.x = bus.stop_x;
            bus.door_open = true;

            let music = scene.world.info().music;
            scene.world.sequence_mut().owns_input = false;
            scene.world.camera_mut().follow = true;
            scene.world.progress_mut().clock_running = true;
            scene.music(music);
            Flow::to(steps::PLAY)
        }
        _ => Flow::Unknown,
    }
}

/// The door closes behind the player and the bus drives out of view.
pub(crate) fn bus_leaving(offset: u16, scene: &mut Scene<'_>) -> Flow {
    match offset {
        0 => {
            scene.close_door();
            Flow::after(steps::BUS_LEAVING + 1, DOOR_CLOSE_DELAY)
        }
        1 => {
            scene.drive_off();
            scene.world.camera_mut().follow = false;
            scene.music(MusicId::Clear);
            Flow::to(steps::BUS_LEAVING + 2)
        }
        2 => {
            if scene.bus_out_of_view() {
                scene.finish(Outcome::LevelCleared)
            } else {
                Flow::Wait
            }
        }
        _ => Flow::Unknown,
    }
}

/// Time ran out in sight of the bus: the door shuts and it leaves.
pub(crate) fn time_up_near(offset: u16, scene: &mut Scene<'_>) -> Flow {
    match offset {
        0 => {
            scene.close_door();
            Flow::after(steps::TIME_UP_NEAR + 1, TIME_UP_NEAR_DELAY)
        }
        1 => {
            scene.drive_off();
            scene.world.camera_mut().follow = false;
            Flow::to(steps::TIME_UP_NEAR + 2)
        }
        2 => {
            if scene.bus_out_of_view() {
                scene.finish(Outcome::TimeUp)
            } else {
                Flow::Wait
            }
        }
        _ => Flow::Unknown,
    }
}

/// Time ran out with the bus out of sight.
pub(crate) fn time_up_far(offset: u16, scene: &mut Scene<'_>) -> Flow {
    match offset {
        0 => Flow::after(steps::TIME_UP_FAR + 1, TIME_UP_FAR_HOLD),
        1 => scene.finish(Outcome::TimeUp),
        _ => Flow::Unknown,
    }
}
