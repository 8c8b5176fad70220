#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Last Bus level without a window.

mod config;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use last_bus_core::Difficulty;

use crate::{
    config::Config,
    session::{Script, Session},
};

/// Plays one level headlessly and prints how it ended.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Level description file to play.
    level: PathBuf,
    /// Optional TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Difficulty, overriding the configuration.
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyArg>,
    /// Level number, overriding the configuration.
    #[arg(long, value_name = "N")]
    number: Option<u32>,
    /// Largest number of frames to simulate.
    #[arg(long, default_value_t = 7200)]
    frames: u32,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Scripted input held by the player.
    #[arg(long, value_enum, default_value_t = Script::Right)]
    input: Script,
    /// Disables audio output.
    #[arg(long)]
    mute: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
    Super,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Normal => Self::Normal,
            DifficultyArg::Hard => Self::Hard,
            DifficultyArg::Super => Self::Super,
        }
    }
}

/// Entry point for the Last Bus command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let session = Session {
        level: cli.level,
        number: cli.number.or(config.level).unwrap_or(1),
        difficulty: cli
            .difficulty
            .map(Difficulty::from)
            .or(config.difficulty)
            .unwrap_or(Difficulty::Normal),
        frames: cli.frames,
        fps: cli.fps,
        script: cli.input,
        audio: config.audio.enabled && !cli.mute,
        viewport: config.viewport,
        physics: config.physics,
    };
    log::debug!("starting {session:?}");

    let report = session::play(&session)?;
    println!("{report}");
    Ok(())
}
