//! Application state management

use crate::theme::{Theme, CANDLELIGHT, FIESTA, MIDNIGHT};
use crate::widgets::CardListState;
use fete_audio::ClipKind;
use fete_input::{Mode, Screen};
use fete_library::Dedication;

/// Frames for each side of the screen fade at 30fps
const FADE_FRAMES: u8 = 15; // 500ms
/// Frames the screen stays dark between fade-out and fade-in
const HOLD_FRAMES: u8 = 2; // ~50ms

/// Message type for colored status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Stage of the welcome-to-dedications transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FadeStage {
    #[default]
    None,
    FadeOut,
    Hold,
    FadeIn,
}

/// Full-screen crossfade between screens. Drives a per-frame dim factor;
/// the screen swap happens at the darkest point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenFade {
    stage: FadeStage,
    frames_left: u8,
}

impl ScreenFade {
    /// Start a fade-out. The caller switches screens when `update`
    /// reports the swap frame.
    pub fn begin(&mut self) {
        self.stage = FadeStage::FadeOut;
        self.frames_left = FADE_FRAMES;
    }

    pub fn is_active(&self) -> bool {
        self.stage != FadeStage::None
    }

    /// Advance one frame. Returns true on the frame the underlying
    /// screen should swap (end of fade-out).
    pub fn update(&mut self) -> bool {
        match self.stage {
            FadeStage::None => false,
            FadeStage::FadeOut => {
                self.frames_left -= 1;
                if self.frames_left == 0 {
                    self.stage = FadeStage::Hold;
                    self.frames_left = HOLD_FRAMES;
                    true
                } else {
                    false
                }
            }
            FadeStage::Hold => {
                self.frames_left -= 1;
                if self.frames_left == 0 {
                    self.stage = FadeStage::FadeIn;
                    self.frames_left = FADE_FRAMES;
                }
                false
            }
            FadeStage::FadeIn => {
                self.frames_left -= 1;
                if self.frames_left == 0 {
                    self.stage = FadeStage::None;
                }
                false
            }
        }
    }

    /// Brightness as a 0-256 fixed-point factor for buffer dimming.
    pub fn dim_factor(&self) -> u16 {
        match self.stage {
            FadeStage::None => 256,
            FadeStage::FadeOut => (self.frames_left as u16 * 256) / FADE_FRAMES as u16,
            FadeStage::Hold => 0,
            FadeStage::FadeIn => {
                ((FADE_FRAMES - self.frames_left) as u16 * 256) / FADE_FRAMES as u16
            }
        }
    }
}

/// Per-card animation state
#[derive(Debug, Clone, Copy, Default)]
pub struct CardVisual {
    /// Card carries the now-playing mark
    pub now_playing: bool,
    /// Frames remaining of the greeting element's end-of-clip flash
    pub greeting_flash: u8,
    /// Frames remaining of the song element's end-of-clip flash
    pub song_flash: u8,
}

impl CardVisual {
    pub fn flash_for(&self, kind: ClipKind) -> u8 {
        match kind {
            ClipKind::Greeting => self.greeting_flash,
            ClipKind::Song => self.song_flash,
        }
    }
}

/// What is currently audible, for the progress display
#[derive(Debug, Clone, Copy)]
pub struct PlaybackInfo {
    pub card: usize,
    pub kind: ClipKind,
    pub position_secs: f64,
    pub duration_secs: f64,
}

/// Application state
pub struct AppState {
    /// Card list with selection, scroll, and per-card visuals
    pub cards: CardListState,

    // UI state
    pub screen: Screen,
    pub fade: ScreenFade,
    pub mode: Mode,
    pub command_buffer: String,
    pub message: Option<String>,
    pub message_type: MessageType,
    pub show_help: bool,
    pub help_scroll: u16,

    /// The welcome start control fires once and stays dark after
    pub start_disabled: bool,
    pub autoplay: bool,
    pub playback: Option<PlaybackInfo>,

    // Theme & animation
    pub theme: Theme,
    pub frame_count: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cards: CardListState::default(),
            screen: Screen::Welcome,
            fade: ScreenFade::default(),
            mode: Mode::Normal,
            command_buffer: String::new(),
            message: None,
            message_type: MessageType::Info,
            show_help: false,
            help_scroll: 0,
            start_disabled: false,
            autoplay: true,
            playback: None,
            theme: Theme::default(),
            frame_count: 0,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dedication set
    pub fn set_dedications(&mut self, dedications: Vec<Dedication>) {
        self.cards.set_dedications(dedications);
        self.playback = None;
    }

    /// Set current mode
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        if mode != Mode::Command {
            self.command_buffer.clear();
        }
    }

    /// Toggle help display
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help up
    pub fn help_scroll_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(3);
    }

    /// Scroll help down
    pub fn help_scroll_down(&mut self) {
        self.help_scroll = self.help_scroll.saturating_add(3);
    }

    /// Set theme by name
    pub fn set_theme(&mut self, name: &str) {
        self.theme = match name.to_lowercase().as_str() {
            "fiesta" | "party" | "pink" => FIESTA,
            "midnight" | "night" | "blue" => MIDNIGHT,
            "candlelight" | "candle" | "amber" => CANDLELIGHT,
            _ => {
                self.set_error(format!(
                    "Unknown theme: {}. Use fiesta/midnight/candlelight",
                    name
                ));
                return;
            }
        };
        self.set_success(format!("Theme set to: {}", self.theme.name));
    }

    /// Clear any displayed message
    pub fn clear_message(&mut self) {
        self.message = None;
        self.message_type = MessageType::Info;
    }

    /// Set a message to display (info level)
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Info;
    }

    /// Set a success message
    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Success;
    }

    /// Set a warning message
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Warning;
    }

    /// Set an error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Error;
    }
}

/// Main application wrapper
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_progression() {
        let mut fade = ScreenFade::default();
        assert_eq!(fade.dim_factor(), 256);

        fade.begin();
        assert!(fade.is_active());

        // Fade-out darkens until the swap frame.
        let mut swapped = false;
        let mut prev = 256;
        for _ in 0..FADE_FRAMES {
            swapped = fade.update();
            let f = fade.dim_factor();
            assert!(f <= prev);
            prev = f;
        }
        assert!(swapped);
        assert_eq!(fade.dim_factor(), 0);

        // Hold stays dark.
        for _ in 0..HOLD_FRAMES {
            assert!(!fade.update());
        }

        // Fade-in brightens back to full.
        for _ in 0..FADE_FRAMES {
            assert!(!fade.update());
        }
        assert!(!fade.is_active());
        assert_eq!(fade.dim_factor(), 256);
    }

    #[test]
    fn test_theme_by_name() {
        let mut state = AppState::new();
        state.set_theme("midnight");
        assert_eq!(state.theme.name, "midnight");
        state.set_theme("bogus");
        // Unknown names keep the current theme and set an error.
        assert_eq!(state.theme.name, "midnight");
        assert_eq!(state.message_type, MessageType::Error);
    }
}
