//! Command definitions for FETE

use std::path::PathBuf;

/// Input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Command,
    Help,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
            Mode::Help => "HELP",
        }
    }
}

/// Which screen the app is showing. Key handling differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Welcome,
    Dedications,
}

/// Commands that can be dispatched from input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Show control
    Start,
    ToggleAutoplay,
    Burst,

    // Card navigation
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    /// Begin the autoplay run from the selected card
    ActivateCard,

    // Manual playback on the selected card
    PlayGreeting,
    PlaySong,
    StopPlayback,

    // UI
    SetTheme(String),
    ToggleHelp,
    HelpScrollUp,
    HelpScrollDown,

    // Data
    LoadData(PathBuf),

    // Mode changes
    EnterCommandMode,
    EnterNormalMode,

    // Command mode
    ExecuteCommand(String),

    // Application
    Quit,
    Cancel,
}
