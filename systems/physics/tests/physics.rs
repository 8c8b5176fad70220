use std::time::Duration;

use last_bus_core::{
    metrics::{GROUND_Y, PASSAGE_FLOOR_Y, PLAYER_BOX_OFFSET_X, PLAYER_BOX_WIDTH},
    steps, Actions, CarColor, Difficulty, Event, GameData, HoleKind, ObjectKind, PhysicsParams,
    PlayerState, SlotId, SoundId,
};
use last_bus_system_level_loader::{load_level, LevelContext};
use last_bus_system_physics::Physics;
use last_bus_world::{Car, GrabbedRope, World};

const HEADER: &str = "level-size 8\nsky-color 1\nbgm 1\n";

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
    player.vx = 0.0;
    player.vy = 0.0;
}

struct Harness {
    physics: Physics,
    params: PhysicsParams,
}

impl Harness {
    fn new() -> Self {
        Self {
            physics: Physics,
            params: PhysicsParams::default(),
        }
    }

    fn frame(&mut self, world: &mut World, held: Actions) -> Vec<Event> {
        let events = vec![Event::TimeAdvanced {
            dt: Duration::from_secs_f64(1.0 / 60.0),
        }];
        let mut out = Vec::new();
        self.physics.handle(
            &events,
            world,
            held,
            &self.params,
            GameData::standard(),
            &mut out,
        );
        out
    }

    fn run(&mut self, world: &mut World, held: Actions, frames: usize) -> Vec<Event> {
        let mut all = Vec::new();
        for _ in 0..frames {
            all.extend(self.frame(world, held));
        }
        all
    }
}

#[test]
fn nothing_moves_without_time_advancing() {
    let mut world = load("");
    place(&mut world, 300.0, GROUND_Y);
    world.player_mut().vx = 100.0;
    let mut physics = Physics;
    let mut out = Vec::new();
    physics.handle(
        &[],
        &mut world,
        Actions::RIGHT,
        &PhysicsParams::default(),
        GameData::standard(),
        &mut out,
    );
    assert_eq!(world.player().x, 300.0);
    assert!(out.is_empty());
}

#[test]
fn walking_into_a_crate_stops_flush_against_it() {
    // The crate stack spans blocks 13..14, so its left edge is 624 px.
    let mut world = load("crates 3 1 2\n");
    place(&mut world, 600.0, GROUND_Y);
    let mut harness = Harness::new();
    let _ = harness.run(&mut world, Actions::RIGHT, 60);

    let player = world.player();
    assert_eq!(player.x, 624.0 - PLAYER_BOX_WIDTH - PLAYER_BOX_OFFSET_X);
    assert_eq!(player.vx, 0.0);
    assert!(player.on_floor);
    assert_eq!(player.y, GROUND_Y);
}

#[test]
fn walking_up_a_ramp_rises_smoothly() {
    // A parked car at block 13 starts with a rising ramp at 624 px.
    let mut world = load("car 3\n");
    place(&mut world, 580.0, GROUND_Y);
    let mut harness = Harness::new();
    let params = PhysicsParams::default();

    let mut heights = vec![world.player().y];
    while world.player().x < 660.0 {
        let _ = harness.frame(&mut world, Actions::RIGHT);
        assert!(world.player().on_floor);
        heights.push(world.player().y);
        assert!(heights.len() < 200, "player stopped before the roof");
    }

    for pair in heights.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-3);
        assert!(pair[0] - pair[1] <= params.slope_step_up);
    }
    assert!((world.player().y - (GROUND_Y - 32.0)).abs() < 1e-3);
}

#[test]
fn spring_launch_bursts_the_exit_lid_once() {
    // Passageway over blocks 12..16; the exit lid spans 720..768 px.
    let mut world = load("passageway 2 4\n");
    place(&mut world, 744.0, PASSAGE_FLOOR_Y);
    let params = PhysicsParams::default();
    {
        let player = world.player_mut();
        player.vy = -params.spring_speed;
        player.on_floor = false;
    }

    let mut harness = Harness::new();
    let mut events = harness.run(&mut world, Actions::empty(), 8);
    assert!(world.particles().len() > 0);
    events.extend(harness.run(&mut world, Actions::empty(), 52));

    let opened = events
        .iter()
        .filter(|event| matches!(event, Event::PassagewayOpened { .. }))
        .count();
    assert_eq!(opened, 1);
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::Crack
    }));
    let (_, hole) = world.holes().iter().next().expect("passageway hole");
    assert_eq!(hole.kind, HoleKind::PassagewayOpen);
    assert_eq!(world.player().y, GROUND_Y);
}

#[test]
fn a_plain_jump_bonks_on_the_exit_lid() {
    let mut world = load("passageway 2 4\n");
    place(&mut world, 744.0, PASSAGE_FLOOR_Y);
    let params = PhysicsParams::default();
    let lid_bottom = GROUND_Y + 32.0;
    {
        let player = world.player_mut();
        player.vy = -params.jump_speed;
        player.on_floor = false;
    }

    let mut harness = Harness::new();
    for _ in 0..40 {
        let events = harness.frame(&mut world, Actions::empty());
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::PassagewayOpened { .. })));
        let top = world.player().bounding_box().top;
        assert!(top >= lid_bottom - 1e-3);
    }
    let (_, hole) = world.holes().iter().next().expect("passageway hole");
    assert_eq!(hole.kind, HoleKind::PassagewayClosed);
}

#[test]
fn falling_into_a_deep_hole_respawns_at_its_point() {
    // Respawn block 11 (528 px) guards the hole spanning 624..768 px.
    let mut world = load("respawn 1\nhole 2 3\n");
    place(&mut world, 696.0, GROUND_Y);
    let mut harness = Harness::new();
    let events = harness.run(&mut world, Actions::empty(), 90);

    let respawns: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::PlayerRespawned { .. }))
        .collect();
    assert_eq!(respawns, vec![&Event::PlayerRespawned { x: 528.0 }]);
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::Fall
    }));

    let player = world.player();
    assert_eq!(player.state, PlayerState::Flicker);
    assert_eq!(player.x, 552.0);
    assert_eq!(player.y, GROUND_Y);
}

#[test]
fn slipping_recovers_through_getting_up() {
    let mut world = load("");
    place(&mut world, 300.0, GROUND_Y);
    let params = PhysicsParams::default();
    let _ = world.player_mut().transition(PlayerState::Slip, &params);
    let mut harness = Harness::new();

    let _ = harness.run(&mut world, Actions::RIGHT, 40);
    assert_eq!(world.player().state, PlayerState::Slip);
    assert_eq!(world.player().x, 300.0);

    let _ = harness.run(&mut world, Actions::empty(), 10);
    assert_eq!(world.player().state, PlayerState::GetUp);

    let _ = harness.run(&mut world, Actions::empty(), 26);
    assert_eq!(world.player().state, PlayerState::Normal);
}

#[test]
fn jump_press_is_an_edge() {
    let mut world = load("");
    place(&mut world, 300.0, GROUND_Y);
    let mut harness = Harness::new();

    let events = harness.frame(&mut world, Actions::JUMP);
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::Jump
    }));
    assert!(world.player().vy < 0.0);

    // Holding the button through the landing does not jump again.
    let events = harness.run(&mut world, Actions::JUMP, 120);
    assert!(!events.contains(&Event::SoundRequested {
        sound: SoundId::Jump
    }));
    assert!(world.player().on_floor);
}

#[test]
fn rope_swing_stays_bounded_and_jumping_lets_go() {
    let mut world = load("rope 3\n");
    let (rope_id, anchor) = world
        .objects()
        .iter()
        .find(|(_, obj)| obj.kind == ObjectKind::RopeVertical)
        .map(|(id, obj)| (id, obj.x))
        .expect("rope");
    place(&mut world, anchor + 20.0, GROUND_Y - 40.0);
    let params = PhysicsParams::default();
    let _ = world
        .player_mut()
        .transition(PlayerState::GrabRope, &params);
    *world.grabbed_rope_mut() = Some(GrabbedRope {
        obj: rope_id,
        anchor_x: anchor,
        offset: 20.0,
        swing_velocity: 0.0,
    });

    let mut harness = Harness::new();
    let mut crossed = false;
    for _ in 0..120 {
        let _ = harness.frame(&mut world, Actions::empty());
        let offset = world.player().x - anchor;
        assert!(offset.abs() <= params.rope_swing_limit + 1e-3);
        crossed |= offset < 0.0;
    }
    assert!(crossed, "the rope never swung back");

    let _ = harness.frame(&mut world, Actions::JUMP);
    assert_eq!(world.player().state, PlayerState::Normal);
    assert!(world.player().vy < 0.0);
    assert!(world.grabbed_rope().is_none());
    assert_eq!(world.rope_release().map(|release| release.obj), Some(rope_id));

    let _ = harness.run(&mut world, Actions::empty(), 40);
    assert!(world.rope_release().is_none());
}

#[test]
fn scripted_actions_replace_held_input() {
    let mut world = load("");
    place(&mut world, 300.0, GROUND_Y);
    world.sequence_mut().owns_input = true;
    world.sequence_mut().scripted = Actions::LEFT;
    let mut harness = Harness::new();
    let _ = harness.run(&mut world, Actions::RIGHT, 30);
    assert!(world.player().x < 300.0);
}

#[test]
fn camera_leads_the_player_when_following() {
    let mut world = load("");
    place(&mut world, 1000.0, GROUND_Y);
    world.camera_mut().follow = true;
    let mut harness = Harness::new();
    let _ = harness.run(&mut world, Actions::empty(), 240);
    let expected = 1000.0 - 0.4 * world.camera().view_width;
    assert!((world.camera().x - expected).abs() < 1.0);
    assert_eq!(world.camera().y, 0.0);
}

#[test]
fn a_passing_car_throws_a_peel_that_lands_on_the_street() {
    let mut world = load("");
    place(&mut world, 100.0, GROUND_Y);
    let peels_before = world
        .objects()
        .iter()
        .filter(|(_, obj)| obj.kind == ObjectKind::Peel)
        .count();
    *world.car_mut() = Some(Car {
        color: CarColor::Red,
        x: 300.0,
        y: GROUND_Y,
        vx: 420.0,
        throw_x: 301.0,
        thrown: false,
    });

    let mut harness = Harness::new();
    let events = harness.frame(&mut world, Actions::empty());
    assert!(events.contains(&Event::SoundRequested {
        sound: SoundId::CarHorn
    }));
    assert_eq!(world.moving_peels().len(), 1);

    let _ = harness.run(&mut world, Actions::empty(), 90);
    assert!(world.moving_peels().is_empty());
    assert!(world.car().is_none());
    let landed: Vec<(SlotId, f32)> = world
        .objects()
        .iter()
        .filter(|(_, obj)| obj.kind == ObjectKind::Peel)
        .map(|(id, obj)| (id, obj.y))
        .collect();
    assert_eq!(landed.len(), peels_before + 1);
    assert!(landed.iter().all(|&(_, y)| y == GROUND_Y));
}
