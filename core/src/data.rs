//! Immutable game tables shared by the loader and the frame systems.
//!
//! Tables are passed by reference through [`GameData`] rather than read from
//! globals, so tests can hand systems a custom table when needed.

use crate::{steps, Difficulty, ObjectKind, SolidKind};
use GoalScene::{DoorSlam, Ending, PeelThrow, Plain};

/// One leg of a geyser movement pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeyserStep {
    /// Vertical speed of the column top; negative values rise.
    pub velocity: f32,
    /// Column height above the street at which the leg ends.
    pub height: f32,
}

/// Solid synthesized for an obstacle, relative to the obstacle's left edge and the street.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolidTemplate {
    /// Collision behaviour of the synthesized solid.
    pub kind: SolidKind,
    /// Left edge offset from the obstacle's left edge.
    pub left: f32,
    /// Top edge offset from the street surface; negative is above it.
    pub top: f32,
    /// Right edge offset from the obstacle's left edge.
    pub right: f32,
    /// Bottom edge offset from the street surface.
    pub bottom: f32,
}

/// Scene played once the player reaches the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalScene {
    /// The player walks to the door and boards.
    Plain,
    /// The door slams and the bus creeps forward first.
    DoorSlam,
    /// The driver throws a peel in the player's path.
    PeelThrow,
    /// The bus leaves with the player and the playthrough ends.
    Ending,
}

impl GoalScene {
    /// Sequence step the scene starts at.
    #[must_use]
    pub const fn first_step(self) -> u16 {
        match self {
            Self::Plain => steps::GOAL_PLAIN,
            Self::DoorSlam => steps::GOAL_DOOR_SLAM,
            Self::PeelThrow => steps::GOAL_PEEL_THROW,
            Self::Ending => steps::ENDING,
        }
    }
}

/// Per-difficulty tuning of a playthrough.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    /// Goal scene of each level, first level first.
    pub goal_scenes: &'static [GoalScene],
    /// Seconds on the clock per `level-size` unit.
    pub seconds_per_section: f32,
}

impl DifficultyProfile {
    /// Number of levels in a playthrough.
    #[must_use]
    pub fn level_count(&self) -> u32 {
        self.goal_scenes.len() as u32
    }

    /// Goal scene of the 1-based `level`; levels outside the playthrough
    /// board plainly.
    #[must_use]
    pub fn goal_scene(&self, level: u32) -> GoalScene {
        level
            .checked_sub(1)
            .and_then(|index| self.goal_scenes.get(index as usize))
            .copied()
            .unwrap_or(GoalScene::Plain)
    }
}

/// Obstacle footprint and its synthesized solids.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleTemplate {
    /// Object kind the template belongs to.
    pub kind: ObjectKind,
    /// Footprint width in level-blocks.
    pub width_blocks: u32,
    /// Solids added when the obstacle is placed.
    pub solids: &'static [SolidTemplate],
}

/// Bundle of immutable tables consulted by the loader and the systems.
#[derive(Debug)]
pub struct GameData {
    geyser_patterns: &'static [&'static [GeyserStep]],
    obstacles: &'static [ObstacleTemplate],
    difficulties: [DifficultyProfile; 4],
}

impl GameData {
    /// Returns the tables shipped with the game.
    #[must_use]
    pub fn standard() -> &'static GameData {
        &STANDARD
    }

    /// Movement pattern for a zero-based pattern index.
    #[must_use]
    pub fn geyser_pattern(&self, index: usize) -> Option<&'static [GeyserStep]> {
        self.geyser_patterns.get(index).copied()
    }

    /// Number of geyser patterns available.
    #[must_use]
    pub fn geyser_pattern_count(&self) -> usize {
        self.geyser_patterns.len()
    }

    /// Obstacle template registered for the object kind, if it has one.
    #[must_use]
    pub fn obstacle(&self, kind: ObjectKind) -> Option<&'static ObstacleTemplate> {
        self.obstacles.iter().find(|template| template.kind == kind)
    }

    /// Profile of the provided difficulty.
    #[must_use]
    pub fn difficulty(&self, difficulty: Difficulty) -> &DifficultyProfile {
        &self.difficulties[difficulty.index()]
    }
}

const fn solid(kind: SolidKind, left: f32, top: f32, right: f32, bottom: f32) -> SolidTemplate {
    SolidTemplate {
        kind,
        left,
        top,
        right,
        bottom,
    }
}

const PATTERN_STEADY: &[GeyserStep] = &[
    GeyserStep {
        velocity: -320.0,
        height: 128.0,
    },
    GeyserStep {
        velocity: 160.0,
        height: 24.0,
    },
];

const PATTERN_SURGE: &[GeyserStep] = &[
    GeyserStep {
        velocity: -480.0,
        height: 176.0,
    },
    GeyserStep {
        velocity: 240.0,
        height: 48.0,
    },
    GeyserStep {
        velocity: -240.0,
        height: 112.0,
    },
    GeyserStep {
        velocity: 120.0,
        height: 0.0,
    },
];

const PATTERN_STUTTER: &[GeyserStep] = &[
    GeyserStep {
        velocity: -200.0,
        height: 96.0,
    },
    GeyserStep {
        velocity: 100.0,
        height: 32.0,
    },
    GeyserStep {
        velocity: -400.0,
        height: 160.0,
    },
    GeyserStep {
        velocity: 200.0,
        height: 8.0,
    },
];

// Car and van wheel wells sit under the ramps, below any walking height.
const CAR_SOLIDS: &[SolidTemplate] = &[
    solid(SolidKind::SlopeUp, 0.0, -32.0, 24.0, 0.0),
    solid(SolidKind::KeepOnTop, 24.0, -32.0, 72.0, 0.0),
    solid(SolidKind::SlopeDown, 72.0, -32.0, 96.0, 0.0),
    solid(SolidKind::Full, 12.0, -8.0, 28.0, 0.0),
    solid(SolidKind::Full, 68.0, -8.0, 84.0, 0.0),
];

const VAN_SOLIDS: &[SolidTemplate] = &[
    solid(SolidKind::SlopeUp, 0.0, -56.0, 32.0, 0.0),
    solid(SolidKind::KeepOnTop, 32.0, -56.0, 144.0, 0.0),
    solid(SolidKind::Full, 32.0, -48.0, 144.0, 0.0),
    solid(SolidKind::Full, 16.0, -8.0, 32.0, 0.0),
];

// Every playthrough ends on its last level.
const EASY_GOALS: &[GoalScene] = &[Plain, DoorSlam, PeelThrow, Ending];
const NORMAL_GOALS: &[GoalScene] = &[Plain, DoorSlam, PeelThrow, Plain, DoorSlam, Ending];
const HARD_GOALS: &[GoalScene] = &[
    Plain, DoorSlam, PeelThrow, Plain, DoorSlam, Plain, DoorSlam, Ending,
];
const SUPER_GOALS: &[GoalScene] = &[
    DoorSlam, Plain, DoorSlam, Plain, DoorSlam, Plain, DoorSlam, Ending,
];

const TRUCK_SOLIDS: &[SolidTemplate] = &[solid(SolidKind::Full, 0.0, -64.0, 192.0, 0.0)];

const SCOOTER_SOLIDS: &[SolidTemplate] = &[solid(SolidKind::Full, 8.0, -20.0, 40.0, 0.0)];

const HYDRANT_SOLIDS: &[SolidTemplate] = &[solid(SolidKind::Full, 16.0, -24.0, 32.0, 0.0)];

const SIGN_SOLIDS: &[SolidTemplate] = &[
    solid(SolidKind::KeepOnTop, 0.0, -120.0, 96.0, -112.0),
    solid(SolidKind::Vertical, 44.0, -112.0, 52.0, 0.0),
];

static STANDARD: GameData = GameData {
    geyser_patterns: &[PATTERN_STEADY, PATTERN_SURGE, PATTERN_STUTTER],
    obstacles: &[
        ObstacleTemplate {
            kind: ObjectKind::ParkedCar,
            width_blocks: 2,
            solids: CAR_SOLIDS,
        },
        ObstacleTemplate {
            kind: ObjectKind::ParkedVan,
            width_blocks: 3,
            solids: VAN_SOLIDS,
        },
        ObstacleTemplate {
            kind: ObjectKind::Truck,
            width_blocks: 4,
            solids: TRUCK_SOLIDS,
        },
        ObstacleTemplate {
            kind: ObjectKind::Scooter,
            width_blocks: 1,
            solids: SCOOTER_SOLIDS,
        },
        ObstacleTemplate {
            kind: ObjectKind::Hydrant,
            width_blocks: 1,
            solids: HYDRANT_SOLIDS,
        },
        ObstacleTemplate {
            kind: ObjectKind::Sign,
            width_blocks: 2,
            solids: SIGN_SOLIDS,
        },
    ],
    difficulties: [
        DifficultyProfile {
            goal_scenes: EASY_GOALS,
            seconds_per_section: 9.0,
        },
        DifficultyProfile {
            goal_scenes: NORMAL_GOALS,
            seconds_per_section: 8.0,
        },
        DifficultyProfile {
            goal_scenes: HARD_GOALS,
            seconds_per_section: 7.0,
        },
        DifficultyProfile {
            goal_scenes: SUPER_GOALS,
            seconds_per_section: 6.0,
        },
    ],
};
