//! Headless playthrough of one level with scripted input.

use std::{fmt, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use last_bus_audio::{AudioChannel, LogSink};
use last_bus_core::{Actions, Command, Difficulty, GameData, Outcome, PhysicsParams};
use last_bus_system_frame::Frame;
use last_bus_system_level_loader::{load_level_file, LevelContext};
use last_bus_world::{self as world, query};

use crate::config::Viewport;

/// Frames between the starts of two jumps in the hopping script.
const HOP_PERIOD: u32 = 40;
/// Frames the jump button stays held in each hop.
const HOP_HOLD: u32 = 6;

/// Input held by the scripted player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Script {
    /// Touches nothing.
    Idle,
    /// Walks right.
    Right,
    /// Walks right and jumps on a fixed rhythm.
    Hop,
}

impl Script {
    fn actions(self, frame: u32) -> Actions {
        match self {
            Self::Idle => Actions::empty(),
            Self::Right => Actions::RIGHT,
            Self::Hop if frame % HOP_PERIOD < HOP_HOLD => Actions::RIGHT | Actions::JUMP,
            Self::Hop => Actions::RIGHT,
        }
    }
}

/// Everything needed to play one level.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) level: PathBuf,
    pub(crate) number: u32,
    pub(crate) difficulty: Difficulty,
    pub(crate) frames: u32,
    pub(crate) fps: u32,
    pub(crate) script: Script,
    pub(crate) audio: bool,
    pub(crate) viewport: Viewport,
    pub(crate) physics: PhysicsParams,
}

/// Result of a playthrough.
#[derive(Debug)]
pub(crate) struct Report {
    number: u32,
    difficulty: Difficulty,
    outcome: Option<Outcome>,
    frames: u64,
    score: u32,
    time_left: f32,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Some(Outcome::LevelCleared) => "cleared",
            Some(Outcome::TimeUp) => "time up",
            Some(Outcome::Ending) => "ending",
            None => "unfinished",
        };
        write!(
            f,
            "level {} ({:?}): {outcome} after {} frames, score {}, {:.1} s left",
            self.number, self.difficulty, self.frames, self.score, self.time_left
        )
    }
}

/// Loads the level and steps it until it ends or the frame budget runs out.
pub(crate) fn play(session: &Session) -> Result<Report> {
    if session.fps == 0 {
        bail!("frame rate must be at least 1");
    }

    let context = LevelContext {
        number: session.number,
        difficulty: session.difficulty,
        data: GameData::standard(),
        params: &session.physics,
    };
    let mut world = load_level_file(&session.level, &context)
        .with_context(|| format!("failed to load level {}", session.level.display()))?;
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ResizeViewport {
            width: session.viewport.width,
            height: session.viewport.height,
        },
        &mut events,
    );

    let mut audio = AudioChannel::spawn(LogSink).context("failed to start audio")?;
    audio.set_enabled(session.audio);

    let mut frame = Frame::new(session.physics);
    let dt = Duration::from_secs_f64(1.0 / f64::from(session.fps));
    for index in 0..session.frames {
        events.clear();
        frame.step(&mut world, dt, session.script.actions(index), &mut events);
        audio.forward(&events);
        if let Some(outcome) = query::outcome(&world) {
            log::info!("level {} ended: {outcome:?}", session.number);
            break;
        }
    }
    audio.shutdown().context("failed to stop audio")?;

    Ok(Report {
        number: session.number,
        difficulty: session.difficulty,
        outcome: query::outcome(&world),
        frames: world.tick_index(),
        score: query::score(&world),
        time_left: query::time_left(&world),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn session(level: &str, script: Script, fps: u32) -> Session {
        Session {
            level: Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("levels")
                .join(level),
            number: 1,
            difficulty: Difficulty::Normal,
            frames: 8000,
            fps,
            script,
            audio: false,
            viewport: Viewport::default(),
            physics: PhysicsParams::default(),
        }
    }

    #[test]
    fn walking_right_clears_the_street() {
        let report = play(&session("street.lvl", Script::Right, 60)).expect("plays");
        assert_eq!(report.outcome, Some(Outcome::LevelCleared));
        assert_eq!(report.score, 50);
        assert!(report.to_string().contains("cleared"));
    }

    #[test]
    fn idling_runs_out_the_clock() {
        let report = play(&session("street.lvl", Script::Idle, 30)).expect("plays");
        assert_eq!(report.outcome, Some(Outcome::TimeUp));
        assert_eq!(report.time_left, 0.0);
    }

    #[test]
    fn the_frame_budget_bounds_the_run() {
        let mut short = session("downtown.lvl", Script::Hop, 60);
        short.frames = 10;
        let report = play(&short).expect("plays");
        assert_eq!(report.outcome, None);
        assert_eq!(report.frames, 10);
        assert!(report.to_string().contains("unfinished"));
    }

    #[test]
    fn hopping_lifts_off_the_floor_on_the_beat() {
        assert_eq!(Script::Hop.actions(0), Actions::RIGHT | Actions::JUMP);
        assert_eq!(Script::Hop.actions(HOP_HOLD), Actions::RIGHT);
        assert_eq!(Script::Hop.actions(HOP_PERIOD), Actions::RIGHT | Actions::JUMP);
        assert_eq!(Script::Idle.actions(3), Actions::empty());
    }

    #[test]
    fn missing_levels_and_zero_rates_are_errors() {
        assert!(play(&session("absent.lvl", Script::Right, 60)).is_err());
        assert!(play(&session("street.lvl", Script::Right, 0)).is_err());
    }
}
