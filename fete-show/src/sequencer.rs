//! Autoplay sequencer - one phase, one pending timer

use fete_audio::ClipKind;
use std::time::{Duration, Instant};
use tracing::debug;

/// Where the run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No run in progress
    Idle,
    /// Current card's greeting is playing (or about to, during its delay)
    PlayingGreeting,
    /// Current card's song is playing (or about to, during its delay)
    PlayingSong,
    /// Between cards, waiting out the advance pause
    Advancing,
    /// The run walked past the last card
    Complete,
}

/// What the sequencer knows about a card: which playable media it has.
/// A song without a local file counts as no song here.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardMedia {
    pub has_greeting: bool,
    pub has_song: bool,
}

/// Side effects for the caller to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Stop whatever is playing before the next clip starts
    PauseAll,
    PlayGreeting(usize),
    PlaySong(usize),
    /// Mark this card as the one now playing
    Highlight(usize),
    /// Remove now-playing marks from every card
    ClearHighlights,
    /// Return a finished clip's visual state to its resting look
    ResetClipVisual(usize, ClipKind),
    /// The run is over
    RunComplete,
}

/// Step delays. Presentation pacing, adjustable without touching logic.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Breath before a card's greeting starts
    pub greeting_delay: Duration,
    /// Breath between a greeting ending and the song starting
    pub song_delay: Duration,
    /// Pause between one card finishing and the next beginning
    pub advance_pause: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            greeting_delay: Duration::from_millis(500),
            song_delay: Duration::from_millis(300),
            advance_pause: Duration::from_millis(1000),
        }
    }
}

/// The single armed timer. Arming a new step replaces the old one, so a
/// stale timer from a superseded step can never fire.
#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    action: PendingAction,
}

#[derive(Debug, Clone, Copy)]
enum PendingAction {
    StartGreeting,
    StartSong,
    StartCard,
}

/// Autoplay run driver.
///
/// Holds one authoritative phase and at most one pending timer. Callers
/// feed it the clock via `tick` and report clip lifecycle through
/// `clip_ended` / `clip_rejected`; it answers with effects to execute.
pub struct Sequencer {
    config: SequencerConfig,
    cards: Vec<CardMedia>,
    autoplay: bool,
    phase: Phase,
    /// True while a run is in progress
    running: bool,
    /// Card the run is on; meaningful only while running
    current: usize,
    pending: Option<Pending>,
}

impl Sequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            cards: Vec::new(),
            autoplay: true,
            phase: Phase::Idle,
            running: false,
            current: 0,
            pending: None,
        }
    }

    /// Replace the card set. Ends any run in progress.
    pub fn set_cards(&mut self, cards: Vec<CardMedia>) {
        self.cards = cards;
        self.phase = Phase::Idle;
        self.running = false;
        self.pending = None;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Card the run is on. None when no run is in progress.
    pub fn current_card(&self) -> Option<usize> {
        self.running.then_some(self.current)
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Flip autoplay. Turning it off mid-run abandons the run but lets
    /// the clip that is already playing run out on its own.
    pub fn set_autoplay(&mut self, on: bool) -> Vec<Effect> {
        self.autoplay = on;
        if !on && self.running {
            debug!("autoplay off, abandoning run at card {}", self.current);
            self.running = false;
            self.phase = Phase::Idle;
            self.pending = None;
            return vec![Effect::ClearHighlights];
        }
        Vec::new()
    }

    /// Begin a run at the given card. A run already in progress is
    /// superseded outright. Does nothing when autoplay is off.
    pub fn start_run(&mut self, index: usize, now: Instant) -> Vec<Effect> {
        if !self.autoplay {
            return Vec::new();
        }
        if index >= self.cards.len() {
            self.phase = Phase::Complete;
            self.running = false;
            self.pending = None;
            return Vec::new();
        }

        debug!("run starting at card {index}");
        self.running = true;
        self.current = index;
        self.enter_card(now)
    }

    /// Advance the clock. Fires the pending step if its time has come.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let Some(pending) = self.pending else {
            return Vec::new();
        };
        if now < pending.due {
            return Vec::new();
        }
        self.pending = None;

        match pending.action {
            PendingAction::StartGreeting => self.clip_effects(Effect::PlayGreeting(self.current)),
            PendingAction::StartSong => self.clip_effects(Effect::PlaySong(self.current)),
            PendingAction::StartCard => self.enter_card(now),
        }
    }

    /// A clip ran to its natural end. The visual reset applies to any
    /// clip, run or manual; the run only moves if the ended clip is the
    /// step it was waiting on.
    pub fn clip_ended(&mut self, card: usize, kind: ClipKind, now: Instant) -> Vec<Effect> {
        let mut effects = vec![Effect::ResetClipVisual(card, kind)];
        effects.extend(self.step_done(card, kind, now));
        effects
    }

    /// A clip failed to start. Treated as an instantly finished step so
    /// one bad file never stalls the run.
    pub fn clip_rejected(&mut self, card: usize, kind: ClipKind, now: Instant) -> Vec<Effect> {
        self.step_done(card, kind, now)
    }

    /// Shared transition for a step ending, naturally or by rejection.
    fn step_done(&mut self, card: usize, kind: ClipKind, now: Instant) -> Vec<Effect> {
        if !self.running || card != self.current {
            return Vec::new();
        }

        match (self.phase, kind) {
            (Phase::PlayingGreeting, ClipKind::Greeting) => {
                if self.cards[self.current].has_song {
                    self.phase = Phase::PlayingSong;
                    self.arm(self.config.song_delay, PendingAction::StartSong, now);
                    Vec::new()
                } else {
                    self.advance(now)
                }
            }
            (Phase::PlayingSong, ClipKind::Song) => self.advance(now),
            _ => Vec::new(),
        }
    }

    /// Enter the current card: greeting first, else song, else move on.
    fn enter_card(&mut self, now: Instant) -> Vec<Effect> {
        let media = self.cards[self.current];
        if media.has_greeting {
            self.phase = Phase::PlayingGreeting;
            self.arm(self.config.greeting_delay, PendingAction::StartGreeting, now);
            Vec::new()
        } else if media.has_song {
            self.phase = Phase::PlayingSong;
            self.arm(self.config.song_delay, PendingAction::StartSong, now);
            Vec::new()
        } else {
            self.advance(now)
        }
    }

    /// Move past the current card.
    fn advance(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = vec![Effect::ClearHighlights];
        self.current += 1;

        if self.current < self.cards.len() && self.autoplay {
            self.phase = Phase::Advancing;
            self.arm(self.config.advance_pause, PendingAction::StartCard, now);
        } else {
            debug!("run complete");
            self.phase = Phase::Complete;
            self.running = false;
            self.pending = None;
            effects.push(Effect::RunComplete);
        }
        effects
    }

    /// Effects for a clip actually starting.
    fn clip_effects(&self, play: Effect) -> Vec<Effect> {
        vec![
            Effect::PauseAll,
            Effect::ClearHighlights,
            Effect::Highlight(self.current),
            play,
        ]
    }

    fn arm(&mut self, delay: Duration, action: PendingAction, now: Instant) {
        self.pending = Some(Pending {
            due: now + delay,
            action,
        });
    }
}
