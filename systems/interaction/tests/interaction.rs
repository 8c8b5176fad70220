use std::time::Duration;

use last_bus_core::{
    metrics::GROUND_Y, steps, Actions, CarColor, Difficulty, Event, GameData, ObjectKind,
    PhysicsParams, PlayerState, SoundId, TriggerPayload,
};
use last_bus_system_interaction::{Interaction, SPARK_DURATION};
use last_bus_system_level_loader::{load_level, LevelContext};
use last_bus_world::{query, AnimationKind, RopeRelease, World};

const HEADER: &str = "level-size 8\nsky-color 1\nbgm 1\n";

/// Frame length that is exact in binary floating point.
const FRAME: f32 = 1.0 / 32.0;

fn load(body: &str) -> World {
    let params = PhysicsParams::default();
    let context = LevelContext {
        number: 1,
        difficulty: Difficulty::Normal,
        data: GameData::standard(),
        params: &params,
    };
    let text = format!("{HEADER}{body}");
    let mut world = load_level(text.as_bytes(), &context).expect("level loads");
    let sequence = world.sequence_mut();
    sequence.step = steps::PLAY;
    sequence.owns_input = false;
    world
}

fn place(world: &mut World, x: f32, y: f32) {
    let player = world.player_mut();
    player.x = x;
    player.y = y;
}

fn frame(world: &mut World, actions: Actions) -> Vec<Event> {
    let events = [Event::TimeAdvanced {
        dt: Duration::from_secs_f32(FRAME),
    }];
    let mut out = Vec::new();
    Interaction.handle(
        &events,
        world,
        actions,
        &PhysicsParams::default(),
        GameData::standard(),
        &mut out,
    );
    out
}

fn crate_state(world: &World) -> (f32, bool) {
    let (_, pushable) = world.pushable_crates().iter().next().expect("crate");
    (pushable.push_remaining, pushable.pushed)
}

fn crate_pushed(events: &[Event]) -> bool {
    events
        .iter()
        .any(|event| matches!(event, Event::CratePushed { .. }))
}

#[test]
fn crate_slides_after_exactly_the_push_duration() {
    // The passageway crate covers 576..624 px; stand flush against it.
    let mut world = load("passageway 2 4\n");
    place(&mut world, 564.0, GROUND_Y);

    for _ in 0..23 {
        assert!(!crate_pushed(&frame(&mut world, Actions::RIGHT)));
    }
    assert_eq!(crate_state(&world), (FRAME, false));

    let events = frame(&mut world, Actions::RIGHT);
    assert!(crate_pushed(&events));
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::CrateSlide
    }));
    assert_eq!(crate_state(&world), (0.0, true));
    assert_eq!(24.0 * FRAME, 0.75);
}

#[test]
fn interrupting_a_push_resets_the_countdown() {
    let mut world = load("passageway 2 4\n");
    place(&mut world, 564.0, GROUND_Y);

    for _ in 0..12 {
        let _ = frame(&mut world, Actions::RIGHT);
    }
    assert_eq!(crate_state(&world), (0.375, false));

    let _ = frame(&mut world, Actions::empty());
    assert_eq!(crate_state(&world), (0.75, false));

    for _ in 0..12 {
        let _ = frame(&mut world, Actions::RIGHT);
    }
    place(&mut world, 500.0, GROUND_Y);
    let _ = frame(&mut world, Actions::RIGHT);
    assert_eq!(crate_state(&world), (0.75, false));

    place(&mut world, 564.0, GROUND_Y);
    for _ in 0..23 {
        assert!(!crate_pushed(&frame(&mut world, Actions::RIGHT)));
    }
    assert!(crate_pushed(&frame(&mut world, Actions::RIGHT)));
}

#[test]
fn triggers_fire_once() {
    // The hen trigger sits at block 12, 576 px.
    let mut world = load("hen-trigger 2\n");
    place(&mut world, 570.0, GROUND_Y);
    assert!(frame(&mut world, Actions::empty()).is_empty());

    place(&mut world, 580.0, GROUND_Y);
    let events = frame(&mut world, Actions::empty());
    let fired: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::TriggerFired { .. }))
        .collect();
    assert_eq!(fired.len(), 1);
    assert!(world.hen().is_some());
    assert!(world.triggers().is_empty());

    // Walking back and past the trigger again does not re-fire it.
    place(&mut world, 500.0, GROUND_Y);
    let _ = frame(&mut world, Actions::empty());
    place(&mut world, 600.0, GROUND_Y);
    let events = frame(&mut world, Actions::empty());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::TriggerFired { .. })));
}

#[test]
fn car_triggers_send_a_car_that_throws_ahead_of_the_trigger() {
    let mut world = load("car-trigger 2 1\n");
    place(&mut world, 600.0, GROUND_Y);
    let events = frame(&mut world, Actions::empty());
    assert!(events.iter().any(|event| matches!(
        event,
        Event::TriggerFired {
            payload: TriggerPayload::Car(CarColor::Red),
            ..
        }
    )));
    let car = world.car().expect("car spawned");
    assert_eq!(car.x, world.camera().x - 96.0);
    assert_eq!(car.throw_x, 576.0 + 4.0 * 48.0 + 96.0);
    assert!(!car.thrown);
}

#[test]
fn coins_score_once_and_leave_a_spark() {
    let mut world = load("silver-coin 3\ngold-coin 0 1\n");
    place(&mut world, 648.0, GROUND_Y);
    let events = frame(&mut world, Actions::empty());
    assert!(events.contains(&Event::ScoreAwarded {
        points: 50,
        total: 50
    }));
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::Coin
    }));

    let sparks: Vec<f32> = world
        .objects()
        .iter()
        .filter(|(_, obj)| obj.kind == ObjectKind::Spark)
        .map(|(_, obj)| obj.timer)
        .collect();
    assert_eq!(sparks, vec![SPARK_DURATION]);

    let events = frame(&mut world, Actions::empty());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ScoreAwarded { .. })));

    // The gold coin floats one block higher; jumping into it pays 100.
    place(&mut world, 648.0, GROUND_Y - 48.0);
    let _ = frame(&mut world, Actions::empty());
    assert_eq!(query::score(&world), 150);
}

#[test]
fn stepping_on_a_peel_slips_and_kicks_it_away() {
    let mut world = load("peel 3\n");
    place(&mut world, 648.0, GROUND_Y);
    let events = frame(&mut world, Actions::empty());
    assert_eq!(world.player().state, PlayerState::Slip);
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::Slip
    }));
    assert_eq!(world.moving_peels().len(), 1);

    let _ = frame(&mut world, Actions::empty());
    assert_eq!(world.moving_peels().len(), 1);
}

#[test]
fn airborne_players_do_not_slip() {
    let mut world = load("peel 3\n");
    place(&mut world, 648.0, GROUND_Y);
    world.player_mut().on_floor = false;
    let _ = frame(&mut world, Actions::empty());
    assert_eq!(world.player().state, PlayerState::Normal);
    assert!(world.moving_peels().is_empty());
}

#[test]
fn cracks_erupt_into_geysers() {
    let mut world = load("geyser 3\n");
    place(&mut world, 648.0, GROUND_Y);
    let events = frame(&mut world, Actions::empty());
    assert_eq!(world.player().state, PlayerState::ThrowBack);
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::Geyser
    }));
    assert_eq!(world.geysers().len(), 1);
    assert!(world
        .objects()
        .iter()
        .any(|(_, obj)| obj.kind == ObjectKind::Geyser));
    assert!(!world.particles().is_empty());
}

#[test]
fn a_flickering_player_is_not_thrown_by_a_new_crack() {
    let mut world = load("geyser 3\n");
    place(&mut world, 648.0, GROUND_Y);
    let _ = world
        .player_mut()
        .transition(PlayerState::Flicker, &PhysicsParams::default());
    let _ = frame(&mut world, Actions::empty());
    assert_eq!(world.player().state, PlayerState::Flicker);
    assert_eq!(world.geysers().len(), 1);
}

#[test]
fn a_just_released_rope_cannot_be_grabbed_again() {
    let mut world = load("rope 3\n");
    let rope = world
        .objects()
        .iter()
        .find(|(_, obj)| obj.kind == ObjectKind::RopeVertical)
        .map(|(id, _)| id)
        .expect("rope");
    place(&mut world, 650.0, 150.0);
    world.player_mut().on_floor = false;
    *world.rope_release_mut() = Some(RopeRelease {
        obj: rope,
        remaining: 0.3,
    });

    let _ = frame(&mut world, Actions::empty());
    assert_eq!(world.player().state, PlayerState::Normal);
    assert!(world.grabbed_rope().is_none());

    *world.rope_release_mut() = None;
    let events = frame(&mut world, Actions::empty());
    assert_eq!(world.player().state, PlayerState::GrabRope);
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::RopeGrab
    }));
    let grabbed = world.grabbed_rope().expect("rope held");
    assert_eq!(grabbed.obj, rope);
    assert_eq!(grabbed.offset, 2.0);
}

#[test]
fn springs_launch_only_falling_or_resting_players() {
    let mut world = load("spring 3\n");
    let params = PhysicsParams::default();
    place(&mut world, 648.0, GROUND_Y);

    let events = frame(&mut world, Actions::empty());
    assert_eq!(world.player().vy, -params.spring_speed);
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::Spring
    }));
    assert_eq!(world.animations().len(), 1);

    let events = frame(&mut world, Actions::empty());
    assert!(!events.contains(&Event::SoundRequested {
        sound: SoundId::Spring
    }));

    world.player_mut().vy = 10.0;
    let _ = frame(&mut world, Actions::empty());
    assert_eq!(world.player().vy, -params.spring_speed);
    let hits: Vec<_> = world
        .animations()
        .iter()
        .filter(|(_, animation)| matches!(animation.kind, AnimationKind::SpringHit { .. }))
        .collect();
    assert_eq!(hits.len(), 1);
}

#[test]
fn hidden_players_touch_nothing() {
    let mut world = load("silver-coin 3\n");
    place(&mut world, 648.0, GROUND_Y);
    let _ = world
        .player_mut()
        .transition(PlayerState::Inactive, &PhysicsParams::default());
    assert!(frame(&mut world, Actions::empty()).is_empty());
    assert_eq!(query::score(&world), 0);
}
