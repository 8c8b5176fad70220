//! Entity records stored in the world's pools and singletons.
//!
//! Positions follow one convention: `x` is the horizontal centre and `y` the
//! bottom edge of the entity, unless a field says otherwise.

use last_bus_core::{
    metrics::{
        GROUND_Y, PLAYER_BOX_OFFSET_X, PLAYER_BOX_WIDTH, PLAYER_HAND_HEIGHT, PLAYER_HEIGHT,
        PLAYER_OFFSTAGE_Y, PLAYER_SLIP_HEIGHT,
    },
    CarColor, Event, HoleKind, ObjectKind, PhysicsParams, PlayerState, Rect, SlotId, SolidKind,
};

/// Static collision region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solid {
    /// Occupied rectangle.
    pub rect: Rect,
    /// Collision behaviour.
    pub kind: SolidKind,
}

/// Gap cut into the street floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hole {
    /// Deep pit or passageway state.
    pub kind: HoleKind,
    /// Left edge in pixels.
    pub x: f32,
    /// Width in pixels.
    pub width: f32,
}

impl Hole {
    /// Right edge in pixels.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Reports whether the horizontal position lies over the gap.
    #[must_use]
    pub fn spans(&self, x: f32) -> bool {
        x > self.x && x < self.right()
    }
}

/// Position the player reappears at after falling into a deep hole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RespawnPoint {
    /// Horizontal position in pixels.
    pub x: f32,
}

/// Generic positioned level object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obj {
    /// Type tag.
    pub kind: ObjectKind,
    /// Horizontal centre.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Remaining lifetime of timed objects such as sparks.
    pub timer: f32,
    /// Movement pattern index of a geyser crack.
    pub pattern: usize,
}

impl Obj {
    /// Creates an untimed object.
    #[must_use]
    pub const fn new(kind: ObjectKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            timer: 0.0,
            pattern: 0,
        }
    }
}

/// Render record of a stack of crates placed by a `crates` line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrateBlock {
    /// Occupied rectangle.
    pub rect: Rect,
    /// Solid synthesized for the stack.
    pub solid: SlotId,
}

/// Active geyser column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geyser {
    /// Object slot of the geyser.
    pub obj: SlotId,
    /// Top edge of the water column.
    pub top: f32,
    /// Vertical speed of the column top.
    pub velocity: f32,
    /// Height the current leg ends at.
    pub destination: f32,
    /// Zero-based movement pattern index.
    pub pattern: usize,
    /// Current leg inside the pattern.
    pub step: usize,
}

impl Geyser {
    /// Column region that throws the player back.
    #[must_use]
    pub fn body(&self, x: f32) -> Rect {
        Rect::new(x - 12.0, self.top, x + 12.0, GROUND_Y)
    }
}

/// Swing state of the rope the player holds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrabbedRope {
    /// Object slot of the vertical rope.
    pub obj: SlotId,
    /// Horizontal position the rope hangs from.
    pub anchor_x: f32,
    /// Current horizontal swing offset of the hand.
    pub offset: f32,
    /// Swing velocity.
    pub swing_velocity: f32,
}

/// Rope that was just let go and may not be grabbed again yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RopeRelease {
    /// Object slot of the released rope.
    pub obj: SlotId,
    /// Seconds until it can be grabbed again.
    pub remaining: f32,
}

/// How a peel came to be in the air.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeelFlight {
    /// Kicked away by the player slipping on it; despawns once it falls away.
    Slipped,
    /// Thrown at the street; becomes a stationary peel when it lands.
    Thrown,
}

/// Peel flying on a ballistic arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovingPeel {
    /// Object slot carrying the peel's position.
    pub obj: SlotId,
    /// Horizontal speed.
    pub vx: f32,
    /// Vertical speed.
    pub vy: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Origin of the flight.
    pub flight: PeelFlight,
}

/// Crate covering a passageway entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PushableCrate {
    /// Object slot of the crate visual.
    pub obj: SlotId,
    /// Solid sliding with the crate.
    pub solid: SlotId,
    /// Passageway the crate covers.
    pub hole: SlotId,
    /// Push time still needed before the crate slides.
    pub push_remaining: f32,
    /// Whether the crate has started sliding.
    pub pushed: bool,
    /// Left edge of the crate.
    pub left: f32,
    /// Left edge the slide stops at.
    pub max_left: f32,
}

/// Position trigger that spawns a passer-by.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trigger {
    /// Horizontal position the player must reach.
    pub x: f32,
    /// Entity spawned on firing.
    pub payload: last_bus_core::TriggerPayload,
}

/// Passing car spawned by a trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Car {
    /// Paint.
    pub color: CarColor,
    /// Horizontal centre.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Horizontal speed.
    pub vx: f32,
    /// Position at which the peel is thrown.
    pub throw_x: f32,
    /// Whether the peel has been thrown.
    pub thrown: bool,
}

/// Hen running across the street.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hen {
    /// Horizontal centre.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Horizontal speed.
    pub vx: f32,
    /// Horizontal acceleration.
    pub ax: f32,
    /// Largest speed magnitude.
    pub max_speed: f32,
}

/// Pose shown by the renderer for the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAnimation {
    /// Standing still.
    Stand,
    /// Walking; frames cycle with speed.
    Walk,
    /// Rising.
    Jump,
    /// Falling.
    Fall,
    /// Sliding on a peel.
    Slip,
    /// Standing back up.
    GetUp,
    /// Knocked back.
    ThrownBack,
    /// Hanging from a rope.
    Hang,
}

/// Controlled character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    /// Horizontal centre.
    pub x: f32,
    /// Feet.
    pub y: f32,
    /// Horizontal speed.
    pub vx: f32,
    /// Vertical speed; negative rises.
    pub vy: f32,
    /// Horizontal acceleration in the current state.
    pub accel: f32,
    /// Horizontal deceleration in the current state.
    pub decel: f32,
    /// Downward acceleration in the current state.
    pub gravity: f32,
    /// Box height.
    pub height: f32,
    /// Movement state.
    pub state: PlayerState,
    /// Countdown owned by timed states.
    pub state_timer: f32,
    /// Whether the feet rested on a floor after the last resolution.
    pub on_floor: bool,
    /// Facing direction.
    pub facing_left: bool,
    /// Remaining buffered jump window.
    pub jump_buffer: f32,
    /// Actions held on the previous frame.
    pub previous_actions: last_bus_core::Actions,
    /// Passageway the player is walking through.
    pub passageway: Option<SlotId>,
    /// Pose.
    pub animation: PlayerAnimation,
    /// Frame index inside the pose.
    pub frame: u8,
    /// Time accumulated toward the next frame.
    pub frame_timer: f32,
}

impl Player {
    /// Creates a standing player at the provided position.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            accel: 0.0,
            decel: 0.0,
            gravity: 0.0,
            height: PLAYER_HEIGHT,
            state: PlayerState::Normal,
            state_timer: 0.0,
            on_floor: true,
            facing_left: false,
            jump_buffer: 0.0,
            previous_actions: last_bus_core::Actions::empty(),
            passageway: None,
            animation: PlayerAnimation::Stand,
            frame: 0,
            frame_timer: 0.0,
        }
    }

    /// Switches to `to`, seeding the state's timer, box height and scalars.
    ///
    /// Returns the change event when the state actually changed.
    pub fn transition(&mut self, to: PlayerState, params: &PhysicsParams) -> Option<Event> {
        let from = self.state;
        self.state = to;
        self.state_timer = 0.0;
        self.height = PLAYER_HEIGHT;
        self.gravity = params.gravity;
        match to {
            PlayerState::Normal | PlayerState::Flicker => {
                self.accel = params.walk_accel;
                self.decel = params.walk_decel;
                if to == PlayerState::Flicker {
                    self.state_timer = params.flicker_duration;
                }
            }
            PlayerState::Slip => {
                self.height = PLAYER_SLIP_HEIGHT;
                self.accel = 0.0;
                self.decel = params.slip_decel;
                self.state_timer = params.slip_duration;
            }
            PlayerState::GetUp => {
                self.accel = 0.0;
                self.decel = params.walk_decel;
                self.state_timer = params.get_up_duration;
            }
            PlayerState::ThrowBack => {
                self.accel = 0.0;
                self.decel = 0.0;
                let backward = if self.facing_left { 1.0 } else { -1.0 };
                self.vx = backward * params.throw_back_speed_x;
                self.vy = -params.throw_back_speed_y;
                self.on_floor = false;
            }
            PlayerState::GrabRope => {
                self.accel = 0.0;
                self.decel = 0.0;
                self.gravity = 0.0;
                self.vy = 0.0;
                self.on_floor = false;
            }
            PlayerState::Inactive => {
                // x stays put so a following camera holds still.
                self.y = PLAYER_OFFSTAGE_Y;
                self.accel = 0.0;
                self.decel = 0.0;
                self.gravity = 0.0;
                self.vx = 0.0;
                self.vy = 0.0;
                self.on_floor = false;
            }
        }
        (from != to).then_some(Event::PlayerStateChanged { from, to })
    }

    /// Collision box at the current position.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        self.box_at(self.x, self.y)
    }

    /// Collision box the player would occupy at the provided position.
    #[must_use]
    pub fn box_at(&self, x: f32, y: f32) -> Rect {
        let left = x + PLAYER_BOX_OFFSET_X;
        Rect::new(left, y - self.height, left + PLAYER_BOX_WIDTH, y)
    }

    /// Probe point used to catch ropes.
    #[must_use]
    pub fn hand(&self) -> (f32, f32) {
        (self.x, self.y - PLAYER_HAND_HEIGHT)
    }
}

/// Goal vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bus {
    /// Rear edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Horizontal speed.
    pub vx: f32,
    /// Horizontal acceleration.
    pub ax: f32,
    /// Largest speed.
    pub max_speed: f32,
    /// Rear edge position of the stop in the reserved final screen.
    pub stop_x: f32,
    /// Whether the door is open.
    pub door_open: bool,
}

impl Bus {
    /// Horizontal position of the door.
    #[must_use]
    pub fn door_x(&self) -> f32 {
        self.x + last_bus_core::metrics::BUS_DOOR_OFFSET
    }
}

/// Camera following the player inside clamp bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Left edge of the view.
    pub x: f32,
    /// Top edge of the view.
    pub y: f32,
    /// Horizontal speed.
    pub vx: f32,
    /// Vertical speed.
    pub vy: f32,
    /// Horizontal position being approached.
    pub dest_x: f32,
    /// Vertical position being approached.
    pub dest_y: f32,
    /// Whether the destination tracks the player.
    pub follow: bool,
    /// Visible width.
    pub view_width: f32,
    /// Visible height.
    pub view_height: f32,
    /// Largest left edge.
    pub max_x: f32,
    /// Largest top edge.
    pub max_y: f32,
}

impl Camera {
    pub(crate) fn new(level_width: f32, view_width: f32, view_height: f32) -> Self {
        let mut camera = Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            dest_x: 0.0,
            dest_y: 0.0,
            follow: false,
            view_width,
            view_height,
            max_x: 0.0,
            max_y: 0.0,
        };
        camera.resize(level_width, view_width, view_height);
        camera
    }

    pub(crate) fn resize(&mut self, level_width: f32, view_width: f32, view_height: f32) {
        self.view_width = view_width;
        self.view_height = view_height;
        self.max_x = (level_width - view_width).max(0.0);
        self.max_y = (last_bus_core::metrics::WORLD_BOTTOM_Y - view_height).max(0.0);
        self.x = self.clamp_x(self.x);
        self.y = self.clamp_y(self.y);
        self.dest_x = self.clamp_x(self.dest_x);
        self.dest_y = self.clamp_y(self.dest_y);
    }

    /// Clamps a left edge into the horizontal bounds.
    #[must_use]
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(0.0, self.max_x)
    }

    /// Clamps a top edge into the vertical bounds.
    #[must_use]
    pub fn clamp_y(&self, y: f32) -> f32 {
        y.clamp(0.0, self.max_y)
    }

    /// Right edge of the view.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.view_width
    }
}

/// Short-lived debris flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Asphalt chips from a cracked street.
    Crack,
    /// Water drops from a geyser.
    Water,
}

/// Debris particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Flavour.
    pub kind: ParticleKind,
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
    /// Horizontal speed.
    pub vx: f32,
    /// Vertical speed.
    pub vy: f32,
    /// Remaining lifetime.
    pub life: f32,
}

/// Sprite animation role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// Compression of the spring in the referenced object slot.
    SpringHit {
        /// Object slot of the spring.
        spring: SlotId,
    },
    /// Flagman waving traffic to a halt.
    Flagman,
    /// Car stuck in the closing traffic jam.
    JamCar,
    /// Bus driver throwing a peel.
    Driver,
}

/// Running sprite animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    /// Role.
    pub kind: AnimationKind,
    /// Horizontal centre.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Horizontal speed.
    pub vx: f32,
    /// Current frame.
    pub frame: u8,
    /// Time accumulated toward the next frame.
    pub frame_timer: f32,
    /// Remaining lifetime; `None` loops until removed.
    pub remaining: Option<f32>,
}

impl Animation {
    /// Creates an animation at frame zero.
    #[must_use]
    pub const fn new(kind: AnimationKind, x: f32, y: f32, remaining: Option<f32>) -> Self {
        Self {
            kind,
            x,
            y,
            vx: 0.0,
            frame: 0,
            frame_timer: 0.0,
            remaining,
        }
    }
}

/// Cursor of the scripted sequence machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceCursor {
    /// Current step id.
    pub step: u16,
    /// Countdown before the step is evaluated.
    pub delay: f32,
    /// Whether scripted actions replace held input.
    pub owns_input: bool,
    /// Actions fed to the player while the sequence owns input.
    pub scripted: last_bus_core::Actions,
    /// Result exposed once the terminal step is reached.
    pub outcome: Option<last_bus_core::Outcome>,
}

/// Score, clock and flags read by the orchestrator and the HUD.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Accumulated score.
    pub score: u32,
    /// Seconds left on the level clock.
    pub time_left: f32,
    /// Whether the clock counts down.
    pub clock_running: bool,
    /// Whether the player reached the bus.
    pub goal_reached: bool,
    /// Whether the clock ran out.
    pub time_up: bool,
    /// Whether the last progress save failed.
    pub save_failed: bool,
}
