//! Audio engine - single-slot clip playback

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What role a clip plays in the show. The engine treats both the same;
/// the kind is carried through events so the sequencer can tell a
/// finished greeting from a finished song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipKind {
    Greeting,
    Song,
}

/// Commands sent to the audio engine
#[derive(Debug, Clone)]
pub enum AudioCommand {
    /// Start a clip, replacing whatever is in the slot.
    /// Using Arc to avoid copying sample data through channels.
    Play {
        card: usize,
        kind: ClipKind,
        samples: Arc<Vec<f32>>,
        duration_secs: f64,
    },
    /// Empty the slot. Silence until the next Play.
    Stop,
    SetVolume(f32),
    Shutdown,
}

/// Events sent from the audio engine
#[derive(Debug, Clone)]
pub enum AudioEvent {
    /// A clip took the slot and began playing
    Started { card: usize, kind: ClipKind },
    /// A clip ran to its natural end
    Finished { card: usize, kind: ClipKind },
    /// A clip could not start
    Rejected {
        card: usize,
        kind: ClipKind,
        reason: String,
    },
    /// Playback position update for the UI
    Progress {
        card: usize,
        kind: ClipKind,
        position_secs: f64,
        duration_secs: f64,
    },
    /// Error occurred
    Error(String),
}

/// The clip currently occupying the slot
struct ActiveClip {
    card: usize,
    kind: ClipKind,
    /// Interleaved stereo at the engine sample rate
    samples: Arc<Vec<f32>>,
    duration_secs: f64,
    /// Read position into `samples`
    position: usize,
    /// Set by the audio callback when the clip runs out; the command
    /// loop collects it via `take_finished`
    finished: bool,
}

/// Audio engine state (held in audio thread)
pub struct EngineState {
    slot: Option<ActiveClip>,
    volume: f32,
    sample_rate: u32,
}

impl EngineState {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            slot: None,
            volume: 1.0,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_playing(&self) -> bool {
        self.slot.is_some()
    }

    /// Process a command. Returns an event the command loop should
    /// forward, if the command produced one.
    pub fn handle_command(&mut self, cmd: AudioCommand) -> Option<AudioEvent> {
        match cmd {
            AudioCommand::Play {
                card,
                kind,
                samples,
                duration_secs,
            } => {
                tracing::debug!("slot takes card {card} {kind:?}");
                // Replace, never mix. The previous occupant is dropped
                // without a Finished event.
                self.slot = Some(ActiveClip {
                    card,
                    kind,
                    samples,
                    duration_secs,
                    position: 0,
                    finished: false,
                });
                Some(AudioEvent::Started { card, kind })
            }
            AudioCommand::Stop => {
                self.slot = None;
                None
            }
            AudioCommand::SetVolume(vol) => {
                self.volume = vol.clamp(0.0, 1.0);
                None
            }
            AudioCommand::Shutdown => None, // Handled at higher level
        }
    }

    /// Fill an interleaved stereo output buffer from the slot.
    /// Runs on the audio callback thread.
    pub fn process(&mut self, output: &mut [f32]) {
        output.fill(0.0);

        let Some(clip) = self.slot.as_mut() else {
            return;
        };
        if clip.finished {
            return;
        }

        let remaining = clip.samples.len().saturating_sub(clip.position);
        let n = remaining.min(output.len());
        let src = &clip.samples[clip.position..clip.position + n];
        for (out, s) in output[..n].iter_mut().zip(src) {
            *out = s * self.volume;
        }
        clip.position += n;

        if clip.position >= clip.samples.len() {
            clip.finished = true;
        }
    }

    /// Collect the Finished event for a clip that ran out, emptying the
    /// slot. Called from the command loop, not the audio callback.
    pub fn take_finished(&mut self) -> Option<AudioEvent> {
        if self.slot.as_ref().is_some_and(|c| c.finished) {
            let clip = self.slot.take()?;
            Some(AudioEvent::Finished {
                card: clip.card,
                kind: clip.kind,
            })
        } else {
            None
        }
    }

    /// Current playback position, for progress display.
    pub fn progress(&self) -> Option<AudioEvent> {
        let clip = self.slot.as_ref()?;
        // Interleaved stereo: two samples per frame
        let position_secs = (clip.position / 2) as f64 / self.sample_rate as f64;
        Some(AudioEvent::Progress {
            card: clip.card,
            kind: clip.kind,
            position_secs,
            duration_secs: clip.duration_secs,
        })
    }
}

/// Handle to communicate with the audio engine
pub struct AudioEngine {
    /// Send commands to audio thread
    pub command_tx: Sender<AudioCommand>,
    /// Receive events from audio thread
    pub event_rx: Receiver<AudioEvent>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
}

impl AudioEngine {
    /// Create channels for engine communication
    pub fn create_channels() -> (
        Sender<AudioCommand>,
        Receiver<AudioCommand>,
        Sender<AudioEvent>,
        Receiver<AudioEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(64);
        let (evt_tx, evt_rx) = bounded(64);
        (cmd_tx, cmd_rx, evt_tx, evt_rx)
    }

    /// Create a new engine handle
    pub fn new(command_tx: Sender<AudioCommand>, event_rx: Receiver<AudioEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Send a command to the audio engine
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.command_tx.try_send(cmd);
    }

    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.command_tx.try_send(AudioCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_cmd(card: usize, kind: ClipKind, frames: usize) -> AudioCommand {
        AudioCommand::Play {
            card,
            kind,
            samples: Arc::new(vec![0.5; frames * 2]),
            duration_secs: frames as f64 / 48000.0,
        }
    }

    #[test]
    fn test_play_emits_started() {
        let mut state = EngineState::new(48000);
        let event = state.handle_command(play_cmd(0, ClipKind::Greeting, 100));
        assert!(matches!(
            event,
            Some(AudioEvent::Started {
                card: 0,
                kind: ClipKind::Greeting
            })
        ));
        assert!(state.is_playing());
    }

    #[test]
    fn test_process_fills_and_finishes() {
        let mut state = EngineState::new(48000);
        state.handle_command(play_cmd(2, ClipKind::Song, 64));

        let mut buf = vec![0.0f32; 256];
        state.process(&mut buf);
        assert_eq!(buf[0], 0.5);
        // 64 frames = 128 samples, the rest stays silent
        assert_eq!(buf[128], 0.0);

        let finished = state.take_finished();
        assert!(matches!(
            finished,
            Some(AudioEvent::Finished {
                card: 2,
                kind: ClipKind::Song
            })
        ));
        assert!(!state.is_playing());
    }

    #[test]
    fn test_play_replaces_slot_without_finished() {
        let mut state = EngineState::new(48000);
        state.handle_command(play_cmd(0, ClipKind::Greeting, 1000));
        state.handle_command(play_cmd(1, ClipKind::Song, 1000));

        // The replaced clip never reports finishing.
        assert!(state.take_finished().is_none());

        let mut buf = vec![0.0f32; 2048];
        for _ in 0..2 {
            state.process(&mut buf);
        }
        let finished = state.take_finished();
        assert!(matches!(
            finished,
            Some(AudioEvent::Finished { card: 1, .. })
        ));
    }

    #[test]
    fn test_stop_empties_slot_silently() {
        let mut state = EngineState::new(48000);
        state.handle_command(play_cmd(0, ClipKind::Song, 1000));
        state.handle_command(AudioCommand::Stop);
        assert!(!state.is_playing());
        assert!(state.take_finished().is_none());

        let mut buf = vec![1.0f32; 64];
        state.process(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_volume_scales_output() {
        let mut state = EngineState::new(48000);
        state.handle_command(AudioCommand::SetVolume(0.5));
        state.handle_command(play_cmd(0, ClipKind::Song, 32));

        let mut buf = vec![0.0f32; 32];
        state.process(&mut buf);
        assert!((buf[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_progress_reports_position() {
        let mut state = EngineState::new(48000);
        state.handle_command(play_cmd(3, ClipKind::Greeting, 48000));

        let mut buf = vec![0.0f32; 9600]; // 4800 frames = 0.1s
        state.process(&mut buf);

        match state.progress() {
            Some(AudioEvent::Progress {
                card,
                position_secs,
                duration_secs,
                ..
            }) => {
                assert_eq!(card, 3);
                assert!((position_secs - 0.1).abs() < 1e-6);
                assert!((duration_secs - 1.0).abs() < 1e-6);
            }
            other => panic!("unexpected progress: {other:?}"),
        }
    }

    #[test]
    fn test_finished_clip_goes_silent() {
        let mut state = EngineState::new(48000);
        state.handle_command(play_cmd(0, ClipKind::Song, 16));

        let mut buf = vec![0.0f32; 64];
        state.process(&mut buf);
        buf.fill(1.0);
        state.process(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
    }
}
