//! Classified level loading failures.

use std::{io, path::PathBuf};

use last_bus_world::PoolFull;
use thiserror::Error;

/// Three-way classification surfaced to callers that only need to know why
/// no playable level exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadErrorKind {
    /// The source could not be read.
    CannotOpen,
    /// The source exceeds the byte limit.
    TooLarge,
    /// The source violates the grammar or a layout invariant.
    Invalid,
}

/// Errors that can occur while loading a level description.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The level file could not be read.
    #[error("cannot open level file {}: {source}", path.display())]
    CannotOpen {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The level description is larger than the format allows.
    #[error("level description is {len} bytes, the limit is {limit}", limit = crate::MAX_LEVEL_BYTES)]
    TooLarge {
        /// Size of the rejected description in bytes.
        len: usize,
    },
    /// The level description is malformed or violates a layout invariant.
    #[error(transparent)]
    Invalid(#[from] InvalidLevel),
}

impl LoadError {
    /// Classification of the failure.
    #[must_use]
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            Self::CannotOpen { .. } => LoadErrorKind::CannotOpen,
            Self::TooLarge { .. } => LoadErrorKind::TooLarge,
            Self::Invalid(_) => LoadErrorKind::Invalid,
        }
    }
}

/// Rejected level description together with the offending line.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("invalid level{}: {reason}", at_line(.line))]
pub struct InvalidLevel {
    /// One-based line number, or 0 for checks over the whole description.
    pub line: usize,
    /// What was wrong.
    pub reason: InvalidReason,
}

impl InvalidLevel {
    pub(crate) fn new(line: usize, reason: InvalidReason) -> Self {
        Self { line, reason }
    }

    pub(crate) fn whole(reason: InvalidReason) -> Self {
        Self::new(0, reason)
    }
}

fn at_line(line: &usize) -> String {
    match *line {
        0 => String::new(),
        line => format!(" at line {line}"),
    }
}

/// Reason a level description was rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InvalidReason {
    /// The bytes are not UTF-8 text.
    #[error("description is not valid text")]
    NotText,
    /// More lines than the format allows.
    #[error("{count} lines, the limit is {limit}", limit = crate::MAX_LEVEL_LINES)]
    TooManyLines {
        /// Line count of the description.
        count: usize,
    },
    /// A trimmed line exceeds the length limit.
    #[error("line is {len} characters long, the limit is {limit}", limit = crate::MAX_LINE_LEN)]
    LineTooLong {
        /// Length of the trimmed line.
        len: usize,
    },
    /// A character outside letters, digits, blanks and hyphens.
    #[error("character {0:?} is not allowed")]
    ForbiddenCharacter(char),
    /// A line with fewer than two or more than five tokens.
    #[error("{count} tokens, expected between 2 and 5")]
    TokenCount {
        /// Token count of the line.
        count: usize,
    },
    /// A keyword that names neither a directive nor an object.
    #[error("unknown keyword {0:?}")]
    UnknownKeyword(String),
    /// A keyword given the wrong number of values.
    #[error("{keyword} takes {expected} values, got {got}")]
    Arity {
        /// Keyword of the line.
        keyword: &'static str,
        /// Accepted value counts.
        expected: &'static str,
        /// Value count found.
        got: usize,
    },
    /// A value that is not 1-4 decimal digits.
    #[error("{0:?} is not a number of at most 4 digits")]
    BadNumber(String),
    /// A value outside its accepted range.
    #[error("{field} must be within {min}-{max}, got {value}")]
    OutOfRange {
        /// Name of the value.
        field: &'static str,
        /// Value found.
        value: u32,
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
    },
    /// A directive given a second time.
    #[error("{0} given more than once")]
    DuplicateDirective(&'static str),
    /// An object line, or the end of the description, reached before every directive.
    #[error("{0} must be given before any object")]
    MissingDirective(&'static str),
    /// An object extending into the bus stop screen.
    #[error("object reaches block {right}, the level ends at block {limit}")]
    PastRightBoundary {
        /// Right extent of the object in level-blocks.
        right: u32,
        /// Largest accepted right extent.
        limit: u32,
    },
    /// Two placements that may not share space.
    #[error("{0} overlaps {1}")]
    Overlap(&'static str, &'static str),
    /// A placement at a position already taken by the same kind.
    #[error("duplicate {0} at block {1}")]
    Duplicate(&'static str, u32),
    /// Triggers placed closer than the minimum spacing.
    #[error("trigger at block {x} is closer than {min} blocks to another trigger")]
    TriggerSpacing {
        /// Position of the rejected trigger.
        x: u32,
        /// Minimum spacing in level-blocks.
        min: u32,
    },
    /// More passageways than a level may hold.
    #[error("more than {0} passageways")]
    TooManyPassageways(usize),
    /// A pool would overflow, now or once runtime spawns are accounted for.
    #[error(transparent)]
    Capacity(#[from] PoolFull),
    /// Respawn points and deep holes do not pair up.
    #[error("{respawns} respawn points for {holes} deep holes")]
    RespawnCount {
        /// Number of respawn points.
        respawns: usize,
        /// Number of deep holes.
        holes: usize,
    },
    /// A respawn point not placed just left of its deep hole.
    #[error("respawn point at block {respawn} does not lie within 4 blocks left of the hole at block {hole}")]
    RespawnPlacement {
        /// Respawn position in level-blocks.
        respawn: u32,
        /// Left edge of the matched hole in level-blocks.
        hole: u32,
    },
}
