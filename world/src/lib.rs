#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Last Bus.
//!
//! The world owns every entity pool. The level loader populates it once, the
//! frame systems mutate it through the accessors below, and adapters read it
//! through [`query`].

use std::time::Duration;

use last_bus_core::{
    metrics::{
        capacity, BUS_START_X, BUS_STOP_OFFSET, DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH, GROUND_Y,
        PLAYER_START_X, SCREEN_WIDTH,
    },
    steps, Actions, Command, Difficulty, Event, MusicId, SkyColor,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

mod entities;
mod pool;

pub use entities::{
    Animation, AnimationKind, Bus, Camera, Car, CrateBlock, Geyser, GrabbedRope, Hen, Hole,
    MovingPeel, Obj, Particle, ParticleKind, PeelFlight, Player, PlayerAnimation, Progress,
    PushableCrate, RespawnPoint, RopeRelease, SequenceCursor, Solid, Trigger,
};
pub use pool::{Pool, PoolFull};

const PARTICLE_SEED: u64 = 0x1a57_b005_0c0f_fee5;

/// Level-wide settings fixed when the level is loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelInfo {
    /// One-based level number inside the playthrough.
    pub number: u32,
    /// Difficulty of the playthrough.
    pub difficulty: Difficulty,
    /// Value of the `level-size` directive.
    pub size: u32,
    /// Level width in pixels, including the reserved final screen.
    pub width: f32,
    /// Sky backdrop.
    pub sky: SkyColor,
    /// Background music.
    pub music: MusicId,
    /// Seconds on the clock when play starts.
    pub time_limit: f32,
}

/// Represents the authoritative Last Bus world state.
#[derive(Debug)]
pub struct World {
    info: LevelInfo,
    solids: Pool<Solid>,
    holes: Pool<Hole>,
    respawn_points: Pool<RespawnPoint>,
    objects: Pool<Obj>,
    crate_blocks: Pool<CrateBlock>,
    geysers: Pool<Geyser>,
    moving_peels: Pool<MovingPeel>,
    pushable_crates: Pool<PushableCrate>,
    triggers: Pool<Trigger>,
    particles: Pool<Particle>,
    animations: Pool<Animation>,
    grabbed_rope: Option<GrabbedRope>,
    rope_release: Option<RopeRelease>,
    car: Option<Car>,
    hen: Option<Hen>,
    player: Player,
    bus: Bus,
    camera: Camera,
    sequence: SequenceCursor,
    progress: Progress,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Creates an empty level with the default viewport.
    #[must_use]
    pub fn new(info: LevelInfo) -> Self {
        Self::with_viewport(info, DEFAULT_VIEW_WIDTH, DEFAULT_VIEW_HEIGHT)
    }

    /// Creates an empty level whose camera clamps to the provided viewport.
    #[must_use]
    pub fn with_viewport(info: LevelInfo, view_width: f32, view_height: f32) -> Self {
        Self {
            solids: Pool::new("solids", capacity::SOLIDS),
            holes: Pool::new("holes", capacity::HOLES),
            respawn_points: Pool::new("respawn points", capacity::RESPAWN_POINTS),
            objects: Pool::new("objects", capacity::OBJECTS),
            crate_blocks: Pool::new("crate blocks", capacity::CRATE_BLOCKS),
            geysers: Pool::new("geysers", capacity::GEYSERS),
            moving_peels: Pool::new("moving peels", capacity::MOVING_PEELS),
            pushable_crates: Pool::new("pushable crates", capacity::PASSAGEWAYS),
            triggers: Pool::new("triggers", capacity::TRIGGERS),
            particles: Pool::new("particles", capacity::PARTICLES),
            animations: Pool::new("animations", capacity::ANIMATIONS),
            grabbed_rope: None,
            rope_release: None,
            car: None,
            hen: None,
            player: Player::new(PLAYER_START_X, GROUND_Y),
            bus: Bus {
                x: BUS_START_X,
                y: GROUND_Y,
                vx: 0.0,
                ax: 0.0,
                max_speed: 0.0,
                stop_x: info.width - SCREEN_WIDTH + BUS_STOP_OFFSET,
                door_open: false,
            },
            camera: Camera::new(info.width, view_width, view_height),
            sequence: SequenceCursor {
                step: steps::APPROACH,
                delay: 0.0,
                owns_input: true,
                scripted: Actions::empty(),
                outcome: None,
            },
            progress: Progress {
                score: 0,
                time_left: info.time_limit,
                clock_running: false,
                goal_reached: false,
                time_up: false,
                save_failed: false,
            },
            rng: ChaCha8Rng::seed_from_u64(PARTICLE_SEED),
            tick_index: 0,
            info,
        }
    }

    /// Level-wide settings.
    #[must_use]
    pub fn info(&self) -> &LevelInfo {
        &self.info
    }

    /// Static solids.
    #[must_use]
    pub fn solids(&self) -> &Pool<Solid> {
        &self.solids
    }

    /// Mutable static solids.
    pub fn solids_mut(&mut self) -> &mut Pool<Solid> {
        &mut self.solids
    }

    /// Holes cut into the street.
    #[must_use]
    pub fn holes(&self) -> &Pool<Hole> {
        &self.holes
    }

    /// Mutable holes.
    pub fn holes_mut(&mut self) -> &mut Pool<Hole> {
        &mut self.holes
    }

    /// Respawn points.
    #[must_use]
    pub fn respawn_points(&self) -> &Pool<RespawnPoint> {
        &self.respawn_points
    }

    /// Mutable respawn points.
    pub fn respawn_points_mut(&mut self) -> &mut Pool<RespawnPoint> {
        &mut self.respawn_points
    }

    /// Generic objects.
    #[must_use]
    pub fn objects(&self) -> &Pool<Obj> {
        &self.objects
    }

    /// Mutable generic objects.
    pub fn objects_mut(&mut self) -> &mut Pool<Obj> {
        &mut self.objects
    }

    /// Crate stacks.
    #[must_use]
    pub fn crate_blocks(&self) -> &Pool<CrateBlock> {
        &self.crate_blocks
    }

    /// Mutable crate stacks.
    pub fn crate_blocks_mut(&mut self) -> &mut Pool<CrateBlock> {
        &mut self.crate_blocks
    }

    /// Active geysers.
    #[must_use]
    pub fn geysers(&self) -> &Pool<Geyser> {
        &self.geysers
    }

    /// Mutable active geysers.
    pub fn geysers_mut(&mut self) -> &mut Pool<Geyser> {
        &mut self.geysers
    }

    /// Peels in flight.
    #[must_use]
    pub fn moving_peels(&self) -> &Pool<MovingPeel> {
        &self.moving_peels
    }

    /// Mutable peels in flight.
    pub fn moving_peels_mut(&mut self) -> &mut Pool<MovingPeel> {
        &mut self.moving_peels
    }

    /// Crates covering passageway entries.
    #[must_use]
    pub fn pushable_crates(&self) -> &Pool<PushableCrate> {
        &self.pushable_crates
    }

    /// Mutable pushable crates.
    pub fn pushable_crates_mut(&mut self) -> &mut Pool<PushableCrate> {
        &mut self.pushable_crates
    }

    /// Unfired triggers.
    #[must_use]
    pub fn triggers(&self) -> &Pool<Trigger> {
        &self.triggers
    }

    /// Mutable triggers.
    pub fn triggers_mut(&mut self) -> &mut Pool<Trigger> {
        &mut self.triggers
    }

    /// Debris particles.
    #[must_use]
    pub fn particles(&self) -> &Pool<Particle> {
        &self.particles
    }

    /// Mutable debris particles.
    pub fn particles_mut(&mut self) -> &mut Pool<Particle> {
        &mut self.particles
    }

    /// Running sprite animations.
    #[must_use]
    pub fn animations(&self) -> &Pool<Animation> {
        &self.animations
    }

    /// Mutable sprite animations.
    pub fn animations_mut(&mut self) -> &mut Pool<Animation> {
        &mut self.animations
    }

    /// Rope the player holds.
    #[must_use]
    pub fn grabbed_rope(&self) -> Option<&GrabbedRope> {
        self.grabbed_rope.as_ref()
    }

    /// Slot of the rope the player holds.
    pub fn grabbed_rope_mut(&mut self) -> &mut Option<GrabbedRope> {
        &mut self.grabbed_rope
    }

    /// Rope still refusing a new grab.
    #[must_use]
    pub fn rope_release(&self) -> Option<&RopeRelease> {
        self.rope_release.as_ref()
    }

    /// Slot of the rope still refusing a new grab.
    pub fn rope_release_mut(&mut self) -> &mut Option<RopeRelease> {
        &mut self.rope_release
    }

    /// Passing car.
    #[must_use]
    pub fn car(&self) -> Option<&Car> {
        self.car.as_ref()
    }

    /// Slot of the passing car.
    pub fn car_mut(&mut self) -> &mut Option<Car> {
        &mut self.car
    }

    /// Running hen.
    #[must_use]
    pub fn hen(&self) -> Option<&Hen> {
        self.hen.as_ref()
    }

    /// Slot of the running hen.
    pub fn hen_mut(&mut self) -> &mut Option<Hen> {
        &mut self.hen
    }

    /// Player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable player.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Bus.
    #[must_use]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable bus.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Sequence cursor.
    #[must_use]
    pub fn sequence(&self) -> &SequenceCursor {
        &self.sequence
    }

    /// Mutable sequence cursor.
    pub fn sequence_mut(&mut self) -> &mut SequenceCursor {
        &mut self.sequence
    }

    /// Score, clock and flags.
    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Mutable score, clock and flags.
    pub fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    /// Number of ticks applied since the level was created.
    #[must_use]
    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Adds points to the score and reports the award.
    pub fn award(&mut self, points: u32, out_events: &mut Vec<Event>) {
        self.progress.score = self.progress.score.saturating_add(points);
        out_events.push(Event::ScoreAwarded {
            points,
            total: self.progress.score,
        });
    }

    /// Scatters `count` particles from the provided point.
    ///
    /// When the pool is full the particle with the least life left is
    /// overwritten.
    pub fn emit_particles(&mut self, kind: ParticleKind, x: f32, y: f32, count: usize) {
        for _ in 0..count {
            let particle = Particle {
                kind,
                x,
                y,
                vx: self.rng.gen_range(-120.0..120.0),
                vy: self.rng.gen_range(-320.0..-120.0),
                life: self.rng.gen_range(0.5..0.9),
            };
            if let Err(particle) = insert_or_reject(&mut self.particles, particle) {
                let oldest = self
                    .particles
                    .iter()
                    .min_by(|(_, a), (_, b)| a.life.total_cmp(&b.life))
                    .map(|(id, _)| id);
                if let Some(id) = oldest {
                    let _ = self.particles.replace(id, particle);
                }
            }
        }
    }
}

fn insert_or_reject<T: Copy>(pool: &mut Pool<T>, value: T) -> Result<(), T> {
    pool.insert(value).map(|_| ()).map_err(|_| value)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            if world.progress.clock_running {
                let seconds = dt.as_secs_f32();
                world.progress.time_left = (world.progress.time_left - seconds).max(0.0);
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::ResizeViewport { width, height } => {
            log::debug!("viewport resized to {width}x{height}");
            world.camera.resize(world.info.width, width, height);
        }
        Command::SetSaveFailed { failed } => {
            world.progress.save_failed = failed;
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Hole, LevelInfo, Obj, Solid, World};
    use last_bus_core::{Actions, HoleKind, Outcome, SlotId};

    /// Level-wide settings.
    #[must_use]
    pub fn level_info(world: &World) -> &LevelInfo {
        &world.info
    }

    /// Terminal outcome of the level, once the sequence has finished.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.sequence.outcome
    }

    /// Whether the player has reached the bus.
    #[must_use]
    pub fn goal_reached(world: &World) -> bool {
        world.progress.goal_reached
    }

    /// Whether the clock has run out.
    #[must_use]
    pub fn time_up(world: &World) -> bool {
        world.progress.time_up
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.progress.score
    }

    /// Seconds left on the clock.
    #[must_use]
    pub fn time_left(world: &World) -> f32 {
        world.progress.time_left
    }

    /// Whether the last progress save failed.
    #[must_use]
    pub fn save_failed(world: &World) -> bool {
        world.progress.save_failed
    }

    /// Actions steering the player this frame.
    ///
    /// Held input is replaced by the scripted actions while the sequence owns
    /// input.
    #[must_use]
    pub fn effective_actions(world: &World, held: Actions) -> Actions {
        if world.sequence.owns_input {
            world.sequence.scripted
        } else {
            held
        }
    }

    /// Whether the renderer should draw the player.
    #[must_use]
    pub fn player_visible(world: &World) -> bool {
        world.player.state != last_bus_core::PlayerState::Inactive
    }

    /// Deep holes sorted by their left edge.
    #[must_use]
    pub fn deep_holes(world: &World) -> Vec<Hole> {
        let mut holes: Vec<Hole> = world
            .holes
            .iter()
            .map(|(_, hole)| *hole)
            .filter(|hole| hole.kind == HoleKind::Deep)
            .collect();
        holes.sort_by(|a, b| a.x.total_cmp(&b.x));
        holes
    }

    /// Respawn point positions sorted left to right.
    #[must_use]
    pub fn respawn_positions(world: &World) -> Vec<f32> {
        let mut points: Vec<f32> = world
            .respawn_points
            .iter()
            .map(|(_, point)| point.x)
            .collect();
        points.sort_by(f32::total_cmp);
        points
    }

    /// Captures a read-only snapshot of the static level layout.
    #[must_use]
    pub fn layout(world: &World) -> LevelLayout {
        LevelLayout {
            solids: world.solids.iter().map(|(id, solid)| (id, *solid)).collect(),
            holes: world.holes.iter().map(|(id, hole)| (id, *hole)).collect(),
            objects: world.objects.iter().map(|(id, obj)| (id, *obj)).collect(),
            respawn_points: respawn_positions(world),
            triggers: world
                .triggers
                .iter()
                .map(|(_, trigger)| trigger.x)
                .collect(),
        }
    }

    /// Static content of a level in slot order.
    #[derive(Clone, Debug, PartialEq)]
    pub struct LevelLayout {
        /// Solids with their slots.
        pub solids: Vec<(SlotId, Solid)>,
        /// Holes with their slots.
        pub holes: Vec<(SlotId, Hole)>,
        /// Objects with their slots.
        pub objects: Vec<(SlotId, Obj)>,
        /// Sorted respawn positions.
        pub respawn_points: Vec<f32>,
        /// Trigger positions in slot order.
        pub triggers: Vec<f32>,
    }
}

/// Clock delta of a frame after clamping to the provided bound.
#[must_use]
pub fn clamp_frame_dt(dt: Duration, max_frame_dt: f32) -> Duration {
    dt.min(Duration::from_secs_f32(max_frame_dt))
}
