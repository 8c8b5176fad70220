#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level loader that turns a textual level description into a populated world.
//!
//! Loading is pure and one-shot: the description is tokenized, every
//! placement is validated in level-block coordinates, and only then is the
//! pixel geometry synthesized. Any failure discards the partially built world.

use std::{fs, path::Path};

use last_bus_core::{Difficulty, GameData, PhysicsParams};
use last_bus_world::{query, World};

mod build;
mod error;
mod layout;
mod parse;

pub use error::{InvalidLevel, InvalidReason, LoadError, LoadErrorKind};

/// Largest accepted level description in bytes.
pub const MAX_LEVEL_BYTES: usize = 4096;

/// Largest accepted number of lines, blank lines included.
pub const MAX_LEVEL_LINES: usize = 255;

/// Largest accepted length of a trimmed line.
pub const MAX_LINE_LEN: usize = 32;

/// Playthrough position and tables a level is loaded against.
#[derive(Clone, Copy, Debug)]
pub struct LevelContext<'a> {
    /// One-based level number.
    pub number: u32,
    /// Difficulty of the playthrough.
    pub difficulty: Difficulty,
    /// Immutable game tables.
    pub data: &'a GameData,
    /// Tuning the runtime entities are seeded with.
    pub params: &'a PhysicsParams,
}

/// Loads a level from the bytes of its description.
pub fn load_level(source: &[u8], context: &LevelContext<'_>) -> Result<World, LoadError> {
    if source.len() > MAX_LEVEL_BYTES {
        return Err(LoadError::TooLarge { len: source.len() });
    }
    let result = std::str::from_utf8(source)
        .map_err(|_| InvalidLevel::whole(InvalidReason::NotText))
        .and_then(|text| {
            let statements = parse::statements(text)?;
            let blueprint = layout::Blueprint::from_statements(&statements, context.data)?;
            build::build(&blueprint, context)
        });

    match result {
        Ok(world) => {
            log::debug!(
                "loaded level {} ({:?}): {} solids, {} objects, {} holes, {:.0}s on the clock",
                context.number,
                context.difficulty,
                world.solids().len(),
                world.objects().len(),
                world.holes().len(),
                query::time_left(&world),
            );
            Ok(world)
        }
        Err(invalid) => {
            log::warn!("rejected level {}: {invalid}", context.number);
            Err(invalid.into())
        }
    }
}

/// Reads and loads a level description from disk.
pub fn load_level_file(
    path: impl AsRef<Path>,
    context: &LevelContext<'_>,
) -> Result<World, LoadError> {
    let path = path.as_ref();
    let source = fs::read(path).map_err(|source| LoadError::CannotOpen {
        path: path.to_path_buf(),
        source,
    })?;
    load_level(&source, context)
}
