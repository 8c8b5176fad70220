use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use last_bus_audio::{AudioChannel, AudioCommand, AudioSink};
use last_bus_core::{Event, MusicId, SoundId};

#[derive(Clone, Default)]
struct Recording(Arc<Mutex<Vec<AudioCommand>>>);

impl Recording {
    fn commands(&self) -> Vec<AudioCommand> {
        self.0.lock().expect("recording lock").clone()
    }
}

impl AudioSink for Recording {
    fn apply(&mut self, command: AudioCommand) {
        self.0.lock().expect("recording lock").push(command);
    }
}

/// Records like [`Recording`] but holds the worker inside `apply` until the
/// gate is dropped.
struct Gated {
    recording: Recording,
    started: Sender<AudioCommand>,
    gate: Receiver<()>,
}

impl AudioSink for Gated {
    fn apply(&mut self, command: AudioCommand) {
        self.recording.apply(command);
        let _ = self.started.send(command);
        let _ = self.gate.recv();
    }
}

#[test]
fn queued_commands_reach_the_sink_before_shutdown_returns() {
    let recording = Recording::default();
    let mut channel = AudioChannel::spawn(recording.clone()).expect("worker starts");

    channel.play_sound(SoundId::Jump);
    channel.play_music(MusicId::Street);
    channel.shutdown().expect("worker joins");

    let commands = recording.commands();
    assert!(commands.contains(&AudioCommand::PlaySound(SoundId::Jump)));
    assert!(commands.contains(&AudioCommand::PlayMusic(MusicId::Street)));
    assert_eq!(commands.len(), 2);
}

#[test]
fn a_busy_worker_only_sees_the_latest_command_per_category() {
    let recording = Recording::default();
    let (started_tx, started) = unbounded();
    let (gate_tx, gate) = unbounded();
    let mut channel = AudioChannel::spawn(Gated {
        recording: recording.clone(),
        started: started_tx,
        gate,
    })
    .expect("worker starts");

    channel.play_sound(SoundId::Jump);
    let first = started
        .recv_timeout(Duration::from_secs(5))
        .expect("worker picks up the first command");
    assert_eq!(first, AudioCommand::PlaySound(SoundId::Jump));

    channel.play_sound(SoundId::Coin);
    channel.play_sound(SoundId::Spring);
    drop(gate_tx);
    channel.shutdown().expect("worker joins");

    assert_eq!(
        recording.commands(),
        vec![
            AudioCommand::PlaySound(SoundId::Jump),
            AudioCommand::PlaySound(SoundId::Spring),
        ]
    );
}

#[test]
fn disabled_audio_drops_commands_and_silences_playback() {
    let recording = Recording::default();
    let mut channel = AudioChannel::spawn(recording.clone()).expect("worker starts");

    channel.set_enabled(false);
    assert!(!channel.is_enabled());
    channel.play_sound(SoundId::Whistle);
    channel.forward(&[Event::MusicRequested {
        music: MusicId::Ending,
    }]);
    channel.shutdown().expect("worker joins");

    assert_eq!(recording.commands(), vec![AudioCommand::StopAll]);
}

#[test]
fn reenabled_audio_plays_again() {
    let recording = Recording::default();
    let mut channel = AudioChannel::spawn(recording.clone()).expect("worker starts");

    channel.set_enabled(false);
    channel.set_enabled(true);
    channel.play_sound(SoundId::Coin);
    channel.shutdown().expect("worker joins");

    assert!(recording
        .commands()
        .contains(&AudioCommand::PlaySound(SoundId::Coin)));
}

#[test]
fn forwarded_events_become_playback_requests() {
    let recording = Recording::default();
    let mut channel = AudioChannel::spawn(recording.clone()).expect("worker starts");

    channel.forward(&[
        Event::TimeAdvanced {
            dt: Duration::from_millis(16),
        },
        Event::MusicStopped {
            music: MusicId::Rush,
        },
        Event::EffectsStopped,
    ]);
    channel.shutdown().expect("worker joins");

    let commands = recording.commands();
    assert!(commands.contains(&AudioCommand::StopMusic(MusicId::Rush)));
    assert!(commands.contains(&AudioCommand::StopSounds));
    assert_eq!(commands.len(), 2);
}

#[test]
fn dropping_the_channel_joins_the_worker() {
    struct Flagged(Arc<AtomicBool>);

    impl AudioSink for Flagged {
        fn apply(&mut self, _command: AudioCommand) {}
    }

    impl Drop for Flagged {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    let dropped = Arc::new(AtomicBool::new(false));
    let channel = AudioChannel::spawn(Flagged(Arc::clone(&dropped))).expect("worker starts");
    drop(channel);

    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn shutdown_twice_is_harmless() {
    let mut channel = AudioChannel::spawn(Recording::default()).expect("worker starts");
    channel.shutdown().expect("worker joins");
    channel.shutdown().expect("already stopped");
}
