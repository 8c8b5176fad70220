use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender, TrySendError};
use last_bus_core::{Event, MusicId, SoundId};

use crate::{AudioCommand, AudioSink, Category};

/// Failure to start or stop the audio worker.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// The operating system refused to start the worker thread.
    #[error("failed to spawn the audio worker")]
    Spawn(#[source] std::io::Error),
    /// The worker panicked before it could be joined.
    #[error("the audio worker panicked")]
    WorkerPanicked,
}

/// Single-entry mailbox whose newest command evicts an unread one.
#[derive(Clone, Debug)]
struct Slot {
    tx: Sender<AudioCommand>,
    rx: Receiver<AudioCommand>,
}

impl Slot {
    fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    fn put(&self, mut command: AudioCommand) {
        loop {
            match self.tx.try_send(command) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(stale) = self.rx.try_recv() {
                        log::trace!("audio command {stale:?} replaced");
                    }
                    command = rejected;
                }
            }
        }
    }

    fn clear(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

#[derive(Debug)]
enum Control {
    StopAll,
    Shutdown,
}

/// Handle the game thread uses to drive the audio worker.
///
/// Dropping the handle shuts the worker down and joins it.
#[derive(Debug)]
pub struct AudioChannel {
    effects: Slot,
    music: Slot,
    control: Sender<Control>,
    enabled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl AudioChannel {
    /// Starts a worker that feeds `sink`.
    pub fn spawn<S: AudioSink>(sink: S) -> Result<Self, AudioError> {
        let effects = Slot::new();
        let music = Slot::new();
        let (control, control_rx) = unbounded();
        let enabled = Arc::new(AtomicBool::new(true));

        let worker = Worker {
            effects: effects.rx.clone(),
            music: music.rx.clone(),
            control: control_rx,
            enabled: Arc::clone(&enabled),
        };
        let handle = thread::Builder::new()
            .name("last-bus-audio".to_owned())
            .spawn(move || worker.run(sink))
            .map_err(AudioError::Spawn)?;

        Ok(Self {
            effects,
            music,
            control,
            enabled,
            worker: Some(handle),
        })
    }

    /// Queues a command in its category's slot.
    ///
    /// Commands sent while audio is disabled are dropped.
    pub fn send(&self, command: AudioCommand) {
        match command.category() {
            None => self.stop_all(),
            Some(_) if !self.is_enabled() => {
                log::trace!("audio disabled, dropping {command:?}");
            }
            Some(Category::Effects) => self.effects.put(command),
            Some(Category::Music) => self.music.put(command),
        }
    }

    /// Plays a sound effect.
    pub fn play_sound(&self, sound: SoundId) {
        self.send(AudioCommand::PlaySound(sound));
    }

    /// Stops a sound effect.
    pub fn stop_sound(&self, sound: SoundId) {
        self.send(AudioCommand::StopSound(sound));
    }

    /// Plays a music track.
    pub fn play_music(&self, music: MusicId) {
        self.send(AudioCommand::PlayMusic(music));
    }

    /// Stops a music track.
    pub fn stop_music(&self, music: MusicId) {
        self.send(AudioCommand::StopMusic(music));
    }

    /// Discards queued commands and silences everything.
    pub fn stop_all(&self) {
        self.effects.clear();
        self.music.clear();
        let _ = self.control.send(Control::StopAll);
    }

    /// Queues the audio requests found in a frame's events.
    pub fn forward(&self, events: &[Event]) {
        for command in events.iter().filter_map(AudioCommand::from_event) {
            self.send(command);
        }
    }

    /// Turns playback on or off. Disabling drops queued commands and stops
    /// whatever is playing.
    pub fn set_enabled(&self, enabled: bool) {
        let was = self.enabled.swap(enabled, Ordering::AcqRel);
        if was == enabled {
            return;
        }
        log::debug!("audio {}", if enabled { "enabled" } else { "disabled" });
        if !enabled {
            self.stop_all();
        }
    }

    /// Whether commands are currently accepted.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Signals the worker to finish and waits for it.
    ///
    /// Commands already queued are delivered first. Calling this again after
    /// the worker stopped does nothing.
    pub fn shutdown(&mut self) -> Result<(), AudioError> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        let _ = self.control.send(Control::Shutdown);
        handle.join().map_err(|_| AudioError::WorkerPanicked)
    }
}

impl Drop for AudioChannel {
    fn drop(&mut self) {
        if let Err(error) = self.shutdown() {
            log::warn!("{error}");
        }
    }
}

struct Worker {
    effects: Receiver<AudioCommand>,
    music: Receiver<AudioCommand>,
    control: Receiver<Control>,
    enabled: Arc<AtomicBool>,
}

impl Worker {
    fn run<S: AudioSink>(self, mut sink: S) {
        log::info!("audio worker started");
        loop {
            select! {
                recv(self.control) -> message => match message {
                    Ok(Control::StopAll) => sink.apply(AudioCommand::StopAll),
                    Ok(Control::Shutdown) | Err(_) => break,
                },
                recv(self.effects) -> command => match command {
                    Ok(command) => self.deliver(&mut sink, command),
                    Err(_) => break,
                },
                recv(self.music) -> command => match command {
                    Ok(command) => self.deliver(&mut sink, command),
                    Err(_) => break,
                },
            }
        }

        let pending: Vec<_> = self.effects.try_iter().chain(self.music.try_iter()).collect();
        for command in pending {
            self.deliver(&mut sink, command);
        }
        log::info!("audio worker stopped");
    }

    fn deliver<S: AudioSink>(&self, sink: &mut S, command: AudioCommand) {
        if self.enabled.load(Ordering::Acquire) {
            sink.apply(command);
        }
    }
}
