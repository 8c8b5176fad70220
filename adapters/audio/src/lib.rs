#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Audio adapter that turns world events into playback on a background worker.
//!
//! The game thread never waits on audio. Commands go into one slot per
//! category where the newest command replaces any that the worker has not
//! picked up yet, and the worker hands them to an [`AudioSink`].

mod channel;

pub use channel::{AudioChannel, AudioError};

use last_bus_core::{Event, MusicId, SoundId};

/// Playback categories that each own a latest-wins slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Fire-and-forget sound effects.
    Effects,
    /// Background and jingle tracks.
    Music,
}

/// Playback request delivered to an [`AudioSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCommand {
    /// Starts a sound effect.
    PlaySound(SoundId),
    /// Stops one sound effect.
    StopSound(SoundId),
    /// Stops every sound effect.
    StopSounds,
    /// Starts a music track.
    PlayMusic(MusicId),
    /// Stops one music track.
    StopMusic(MusicId),
    /// Stops effects and music alike.
    StopAll,
}

impl AudioCommand {
    /// Slot the command travels through, or `None` for commands that span
    /// both categories.
    #[must_use]
    pub const fn category(self) -> Option<Category> {
        match self {
            Self::PlaySound(_) | Self::StopSound(_) | Self::StopSounds => Some(Category::Effects),
            Self::PlayMusic(_) | Self::StopMusic(_) => Some(Category::Music),
            Self::StopAll => None,
        }
    }

    /// Translates a world event into a playback request.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        match *event {
            Event::SoundRequested { sound } => Some(Self::PlaySound(sound)),
            Event::MusicRequested { music } => Some(Self::PlayMusic(music)),
            Event::MusicStopped { music } => Some(Self::StopMusic(music)),
            Event::EffectsStopped => Some(Self::StopSounds),
            _ => None,
        }
    }
}

/// Device the worker drives.
pub trait AudioSink: Send + 'static {
    /// Performs one playback request.
    fn apply(&mut self, command: AudioCommand);
}

/// Sink that only reports what it would play.
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn apply(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::PlaySound(sound) => log::debug!("play sound {sound:?}"),
            AudioCommand::StopSound(sound) => log::debug!("stop sound {sound:?}"),
            AudioCommand::StopSounds => log::debug!("stop sounds"),
            AudioCommand::PlayMusic(music) => log::debug!("play music {music:?}"),
            AudioCommand::StopMusic(music) => log::debug!("stop music {music:?}"),
            AudioCommand::StopAll => log::debug!("stop all audio"),
        }
    }
}
