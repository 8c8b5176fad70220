#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Last Bus simulation.
//!
//! This crate defines the vocabulary that connects the level loader, the
//! authoritative world, the frame systems and the adapters. Adapters submit
//! [`Command`] values at the frame boundary, the world and systems mutate the
//! simulation deterministically, and [`Event`] values flow back out for the
//! audio channel and the level-progression orchestrator to consume.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod data;
pub mod metrics;
pub mod steps;
pub mod tuning;

pub use data::{
    DifficultyProfile, GameData, GeyserStep, GoalScene, ObstacleTemplate, SolidTemplate,
};
pub use tuning::PhysicsParams;

/// Commands that adapters may submit to the world at the frame boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided, already clamped, delta.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reconfigures the viewport used to clamp the camera.
    ResizeViewport {
        /// Visible width in pixels.
        width: f32,
        /// Visible height in pixels.
        height: f32,
    },
    /// Records whether the external progress store failed its last save.
    SetSaveFailed {
        /// Whether the most recent save attempt failed.
        failed: bool,
    },
}

/// Events broadcast by the world and systems while a frame is processed.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Requests a fire-and-forget sound effect.
    SoundRequested {
        /// Effect to play.
        sound: SoundId,
    },
    /// Requests that a music track starts playing.
    MusicRequested {
        /// Track to play.
        music: MusicId,
    },
    /// Requests that a music track stops.
    MusicStopped {
        /// Track to stop.
        music: MusicId,
    },
    /// Requests that every playing sound effect stops.
    EffectsStopped,
    /// Reports points added to the player's score.
    ScoreAwarded {
        /// Points added by this award.
        points: u32,
        /// Score after the award.
        total: u32,
    },
    /// Reports a change of the player's movement state.
    PlayerStateChanged {
        /// State before the transition.
        from: PlayerState,
        /// State after the transition.
        to: PlayerState,
    },
    /// Reports that the player fell into a deep hole and reappeared.
    PlayerRespawned {
        /// Horizontal position of the respawn point used.
        x: f32,
    },
    /// Reports that a position trigger fired.
    TriggerFired {
        /// Slot of the trigger that fired.
        trigger: SlotId,
        /// Entity spawned by the trigger.
        payload: TriggerPayload,
    },
    /// Reports that a pushable crate started sliding.
    CratePushed {
        /// Slot of the pushable crate.
        crate_slot: SlotId,
    },
    /// Reports that a passageway exit was opened from below.
    PassagewayOpened {
        /// Slot of the hole whose exit opened.
        hole: SlotId,
    },
    /// Reports that the player reached the bus.
    GoalReached,
    /// Reports that the level timer ran out.
    TimeUp,
    /// Reports that the scripted sequence reached its terminal step.
    SequenceFinished {
        /// Result the orchestrator should act upon.
        outcome: Outcome,
    },
}

/// Total simulated time reported by `TimeAdvanced` events, if the frame advanced.
#[must_use]
pub fn elapsed(events: &[Event]) -> Option<Duration> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .reduce(|total, dt| total + dt)
}

bitflags::bitflags! {
    /// Abstract actions held during a frame, already debounced by the input adapter.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Actions: u8 {
        /// Move left.
        const LEFT = 1 << 0;
        /// Move right; also pushes crates.
        const RIGHT = 1 << 1;
        /// Jump, or release a grabbed rope.
        const JUMP = 1 << 2;
        /// Reserved for crouching.
        const DOWN = 1 << 3;
        /// Pause request, consumed by the orchestrator.
        const PAUSE = 1 << 4;
    }
}

/// Index of a slot inside one of the world's fixed-capacity pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u16);

impl SlotId {
    /// Creates a slot identifier from its numeric index.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Retrieves the identifier as a `usize` suitable for indexing.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Axis-aligned rectangle in pixel space with y growing downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Rect {
    /// Creates a rectangle from its four edges.
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Reports whether the horizontal spans overlap with positive length.
    #[must_use]
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.left < other.right && self.right > other.left
    }

    /// Reports whether the vertical spans overlap with positive length.
    #[must_use]
    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.top < other.bottom && self.bottom > other.top
    }

    /// Reports whether both spans overlap; touching edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_horizontally(other) && self.overlaps_vertically(other)
    }

    /// Reports whether the point lies inside the half-open rectangle.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Returns the rectangle moved by the provided offsets.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Returns the rectangle grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.left - margin,
            self.top - margin,
            self.right + margin,
            self.bottom + margin,
        )
    }
}

/// Collision behaviour attached to a static solid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolidKind {
    /// Blocks movement on both axes.
    Full,
    /// Blocks vertical movement only; never stops horizontal motion.
    Vertical,
    /// One-way floor rising toward the right edge.
    SlopeUp,
    /// One-way floor falling toward the right edge.
    SlopeDown,
    /// One-way floor that only blocks downward motion.
    KeepOnTop,
    /// Passageway mouth; ignored while falling, blocks upward exits.
    PassagewayEntry,
    /// Passageway lid; ignored while launched upward above the exit threshold.
    PassagewayExit,
}

impl SolidKind {
    /// Reports whether the kind takes part in horizontal resolution.
    #[must_use]
    pub const fn blocks_horizontally(self) -> bool {
        matches!(self, Self::Full)
    }

    /// Reports whether the kind interpolates its floor height.
    #[must_use]
    pub const fn is_slope(self) -> bool {
        matches!(self, Self::SlopeUp | Self::SlopeDown)
    }
}

/// Kind of gap cut into the street floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HoleKind {
    /// Bottomless pit; falling in costs a respawn.
    Deep,
    /// Underground shortcut whose exit lid is still shut.
    PassagewayClosed,
    /// Underground shortcut whose exit lid has been burst open.
    PassagewayOpen,
}

impl HoleKind {
    /// Reports whether the hole is an underground passageway.
    #[must_use]
    pub const fn is_passageway(self) -> bool {
        matches!(self, Self::PassagewayClosed | Self::PassagewayOpen)
    }
}

/// Type tag carried by each generic level object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Silver coin worth 50 points.
    SilverCoin,
    /// Gold coin worth 100 points.
    GoldCoin,
    /// Pushable crate covering a passageway entry.
    Crate,
    /// Banana peel lying on the street.
    Peel,
    /// Active geyser column.
    Geyser,
    /// Dormant geyser crack waiting to be stepped on.
    GeyserCrack,
    /// Overhead beam a rope hangs from.
    RopeHorizontal,
    /// Hanging rope the player may grab.
    RopeVertical,
    /// Spring that launches the player upward.
    Spring,
    /// Fire hydrant obstacle.
    Hydrant,
    /// Overhead sign with a board to stand on.
    Sign,
    /// Parked car with ramps on both ends.
    ParkedCar,
    /// Parked van with a ramp on its front.
    ParkedVan,
    /// Parked truck with a flat body.
    Truck,
    /// Parked scooter obstacle.
    Scooter,
    /// Short-lived spark left behind by a collected coin.
    Spark,
}

impl ObjectKind {
    /// Points awarded when the object is collected.
    #[must_use]
    pub const fn coin_value(self) -> Option<u32> {
        match self {
            Self::SilverCoin => Some(50),
            Self::GoldCoin => Some(100),
            _ => None,
        }
    }
}

/// Movement state of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// Controllable walking and jumping.
    Normal,
    /// Sliding on a banana peel.
    Slip,
    /// Standing back up after a slip or a throw-back.
    GetUp,
    /// Knocked backward by a geyser.
    ThrowBack,
    /// Hanging from a rope.
    GrabRope,
    /// Controllable, blinking and protected after a respawn.
    Flicker,
    /// Hidden and frozen during scripted scenes.
    Inactive,
}

impl PlayerState {
    /// Reports whether held input steers the player in this state.
    #[must_use]
    pub const fn is_controllable(self) -> bool {
        matches!(self, Self::Normal | Self::Flicker)
    }
}

/// Paint applied to a passing car spawned by a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarColor {
    /// Red car.
    Red,
    /// Blue car.
    Blue,
    /// Yellow car.
    Yellow,
}

impl CarColor {
    /// Maps the level-file colour number (1-3) to a colour.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Red),
            2 => Some(Self::Blue),
            3 => Some(Self::Yellow),
            _ => None,
        }
    }
}

/// Entity spawned when a trigger fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerPayload {
    /// A passing car of the given colour that throws a banana peel.
    Car(CarColor),
    /// A running hen.
    Hen,
}

/// Difficulty selected for a playthrough.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Generous timer, short route.
    Easy,
    /// Default difficulty.
    Normal,
    /// Tight timer.
    Hard,
    /// Tightest timer and alternate scripted scenes.
    Super,
}

impl Difficulty {
    /// Zero-based index used for table lookups.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Normal => 1,
            Self::Hard => 2,
            Self::Super => 3,
        }
    }
}

/// Sky backdrop selected by the `sky-color` directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkyColor {
    /// Pale morning sky.
    Morning,
    /// Bright noon sky.
    Noon,
    /// Orange evening sky.
    Evening,
}

impl SkyColor {
    /// Maps the level-file value (1-3) to a sky colour.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Morning),
            2 => Some(Self::Noon),
            3 => Some(Self::Evening),
            _ => None,
        }
    }
}

/// Music tracks known to the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MusicId {
    /// First background track.
    Street,
    /// Second background track.
    Rush,
    /// Third background track.
    Downtown,
    /// Level clear jingle.
    Clear,
    /// Time-up jingle.
    TimeUp,
    /// Ending theme.
    Ending,
}

impl MusicId {
    /// Maps the `bgm` directive value (1-3) to a background track.
    #[must_use]
    pub const fn from_bgm_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Street),
            2 => Some(Self::Rush),
            3 => Some(Self::Downtown),
            _ => None,
        }
    }
}

/// Sound effects known to the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundId {
    /// Player jump.
    Jump,
    /// Coin pickup.
    Coin,
    /// Slipping on a peel.
    Slip,
    /// Hit by a geyser.
    ThrowBack,
    /// Geyser bursting out of its crack.
    Geyser,
    /// Spring launch.
    Spring,
    /// Rope grabbed.
    RopeGrab,
    /// Passageway lid burst open.
    Crack,
    /// Fell into a deep hole.
    Fall,
    /// Crate starts sliding.
    CrateSlide,
    /// Passing car horn.
    CarHorn,
    /// Hen cluck.
    Hen,
    /// Bus door opening or closing.
    BusDoor,
    /// Bus engine starting.
    BusEngine,
    /// Flagman whistle.
    Whistle,
}

/// Terminal result of a level reported to the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The player boarded the bus and it left.
    LevelCleared,
    /// The timer ran out before the player reached the bus.
    TimeUp,
    /// The final level's ending sequence completed.
    Ending,
}

#[cfg(test)]
mod tests {
    use super::{Actions, CarColor, Difficulty, MusicId, Rect, SkyColor, SolidKind};

    #[test]
    fn touching_rectangles_do_not_overlap() {
        let left = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(!left.overlaps(&right));
        assert!(left.overlaps(&right.translated(-0.5, 0.0)));
    }

    #[test]
    fn contains_point_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(0.0, 0.0));
        assert!(!rect.contains_point(10.0, 5.0));
    }

    #[test]
    fn only_full_solids_block_horizontally() {
        assert!(SolidKind::Full.blocks_horizontally());
        assert!(!SolidKind::Vertical.blocks_horizontally());
        assert!(!SolidKind::KeepOnTop.blocks_horizontally());
        assert!(SolidKind::SlopeDown.is_slope());
    }

    #[test]
    fn level_file_codes_are_one_based() {
        assert_eq!(CarColor::from_code(0), None);
        assert_eq!(CarColor::from_code(3), Some(CarColor::Yellow));
        assert_eq!(SkyColor::from_code(2), Some(SkyColor::Noon));
        assert_eq!(MusicId::from_bgm_code(4), None);
    }

    #[test]
    fn difficulty_parses_from_lowercase_names() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            difficulty: Difficulty,
        }
        let parsed: Wrapper = toml::from_str("difficulty = \"super\"").expect("parse");
        assert_eq!(parsed.difficulty, Difficulty::Super);
    }

    #[test]
    fn elapsed_sums_time_advances() {
        use std::time::Duration;

        use super::{elapsed, Event};

        assert_eq!(elapsed(&[Event::GoalReached]), None);
        let events = [
            Event::TimeAdvanced {
                dt: Duration::from_millis(10),
            },
            Event::TimeUp,
            Event::TimeAdvanced {
                dt: Duration::from_millis(5),
            },
        ];
        assert_eq!(elapsed(&events), Some(Duration::from_millis(15)));
    }

    #[test]
    fn actions_combine() {
        let held = Actions::RIGHT | Actions::JUMP;
        assert!(held.contains(Actions::RIGHT));
        assert!(!held.contains(Actions::LEFT));
    }
}
