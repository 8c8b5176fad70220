use std::time::Duration;

use last_bus_core::{
    metrics::PASSAGE_CAMERA_Y, Actions, Difficulty, Event, GameData, HoleKind, Outcome,
    PhysicsParams,
};
use last_bus_system_frame::Frame;
use last_bus_system_level_loader::{load_level, LevelContext};
use last_bus_world::{query, World};

const LEVEL: &str = "level-size 8\nsky-color 1\nbgm 1\nsilver-coin 4\n";

/// Passageway over blocks 12..16 with the crate covering its entry.
const UNDERPASS: &str = "level-size 20\nsky-color 1\nbgm 1\npassageway 2 4\n";

fn load() -> World {
    load_text(LEVEL)
}

fn load_text(text: &str) -> World {
    let params = PhysicsParams::default();
    let context = LevelContext {
        number: 1,
        difficulty: Difficulty::Normal,
        data: GameData::standard(),
        params: &params,
    };
    load_level(text.as_bytes(), &context).expect("level loads")
}

fn play_until_outcome(
    frame: &mut Frame,
    world: &mut World,
    dt: Duration,
    held: Actions,
    limit: usize,
) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..limit {
        frame.step(world, dt, held, &mut events);
        if query::outcome(world).is_some() {
            break;
        }
    }
    events
}

#[test]
fn long_frames_are_clamped_before_anything_moves() {
    let mut frame = Frame::new(PhysicsParams::default());
    let mut world = load();
    world.progress_mut().clock_running = true;
    let before = query::time_left(&world);

    let mut events = Vec::new();
    frame.step(&mut world, Duration::from_secs(1), Actions::empty(), &mut events);

    let Some(Event::TimeAdvanced { dt }) = events.first() else {
        panic!("the clock tick leads the frame's events");
    };
    let max = frame.params().max_frame_dt;
    assert!(dt.as_secs_f32() <= max + f32::EPSILON);
    assert!((before - query::time_left(&world) - max).abs() < 1e-4);
    assert_eq!(world.tick_index(), 1);
}

#[test]
fn holding_right_clears_the_level() {
    let mut frame = Frame::new(PhysicsParams::default());
    let mut world = load();
    let events = play_until_outcome(
        &mut frame,
        &mut world,
        Duration::from_secs_f64(1.0 / 60.0),
        Actions::RIGHT,
        4000,
    );

    assert_eq!(query::outcome(&world), Some(Outcome::LevelCleared));
    assert!(query::goal_reached(&world));
    assert!(!query::time_up(&world));
    assert_eq!(query::score(&world), 50);
    assert!(query::time_left(&world) > 0.0);
    assert!(query::time_left(&world) < query::level_info(&world).time_limit);
    assert!(events.contains(&Event::GoalReached));
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::SequenceFinished { .. }))
            .count(),
        1
    );
}

#[test]
fn standing_still_runs_the_clock_out() {
    let mut frame = Frame::new(PhysicsParams::default());
    let mut world = load();
    let events = play_until_outcome(
        &mut frame,
        &mut world,
        Duration::from_secs_f64(1.0 / 30.0),
        Actions::empty(),
        3000,
    );

    assert_eq!(query::outcome(&world), Some(Outcome::TimeUp));
    assert!(query::time_up(&world));
    assert_eq!(query::time_left(&world), 0.0);
    assert!(events.contains(&Event::TimeUp));
}

#[test]
fn a_finished_level_stays_finished() {
    let mut frame = Frame::new(PhysicsParams::default());
    let mut world = load();
    let _ = play_until_outcome(
        &mut frame,
        &mut world,
        Duration::from_secs_f64(1.0 / 30.0),
        Actions::empty(),
        3000,
    );
    let outcome = query::outcome(&world);
    assert!(outcome.is_some());

    let mut events = Vec::new();
    for _ in 0..30 {
        frame.step(
            &mut world,
            Duration::from_secs_f64(1.0 / 30.0),
            Actions::RIGHT | Actions::JUMP,
            &mut events,
        );
    }
    assert_eq!(query::outcome(&world), outcome);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SequenceFinished { .. })));
}

#[test]
fn walking_through_a_passageway_lowers_the_camera_until_the_exit() {
    let mut frame = Frame::new(PhysicsParams::default());
    let mut world = load_text(UNDERPASS);
    let dt = Duration::from_secs_f64(1.0 / 60.0);

    let mut entered = false;
    let mut exited = false;
    let mut events = Vec::new();
    for _ in 0..900 {
        events.clear();
        frame.step(&mut world, dt, Actions::RIGHT, &mut events);
        if world.player().passageway.is_some() {
            entered = true;
            assert_eq!(world.camera().dest_y, PASSAGE_CAMERA_Y);
        } else if entered {
            exited = true;
            break;
        }
    }
    assert!(entered, "the player never dropped into the passageway");
    assert!(exited, "the player never climbed out of the passageway");
    assert_eq!(world.camera().dest_y, 0.0);
    let (_, hole) = world.holes().iter().next().expect("passageway hole");
    assert_eq!(hole.kind, HoleKind::PassagewayOpen);

    for _ in 0..120 {
        frame.step(&mut world, dt, Actions::RIGHT, &mut events);
    }
    assert!(world.player().passageway.is_none());
    assert_eq!(world.camera().y, 0.0);
}
