//! Modal state machine for keyboard input handling

use crate::commands::{Command, Mode, Screen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handles keyboard input and converts to commands
pub struct InputHandler {
    mode: Mode,
    screen: Screen,
    command_buffer: String,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            screen: Screen::Welcome,
            command_buffer: String::new(),
        }
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Tell the handler which screen is up
    pub fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    /// Get current command buffer (for display)
    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        match self.mode {
            Mode::Normal => match self.screen {
                Screen::Welcome => self.handle_welcome(key),
                Screen::Dedications => self.handle_normal_mode(key),
            },
            Mode::Command => self.handle_command_mode(key),
            Mode::Help => self.handle_help_mode(key),
        }
    }

    /// The welcome screen only starts the show or quits.
    fn handle_welcome(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Start),
            KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Char('?') => {
                self.mode = Mode::Help;
                Some(Command::ToggleHelp)
            }
            KeyCode::Esc => Some(Command::Cancel),
            _ => None,
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            // Mode switching
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_buffer.clear();
                Some(Command::EnterCommandMode)
            }
            KeyCode::Char('?') => {
                self.mode = Mode::Help;
                Some(Command::ToggleHelp)
            }

            // Card navigation
            KeyCode::Char('j') | KeyCode::Down => Some(Command::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Command::SelectPrev),
            KeyCode::Char('g') | KeyCode::Home => Some(Command::SelectFirst),
            KeyCode::Char('G') | KeyCode::End => Some(Command::SelectLast),

            // Run control
            KeyCode::Enter => Some(Command::ActivateCard),
            KeyCode::Char('a') => Some(Command::ToggleAutoplay),

            // Manual playback
            KeyCode::Char('v') => Some(Command::PlayGreeting),
            KeyCode::Char('s') => Some(Command::PlaySong),
            KeyCode::Char('x') => Some(Command::StopPlayback),

            // One more shower of confetti
            KeyCode::Char('b') => Some(Command::Burst),

            // Quit
            KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }

            KeyCode::Esc => Some(Command::Cancel),

            _ => None,
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                let cmd = self.parse_command();
                self.mode = Mode::Normal;
                let buffer = std::mem::take(&mut self.command_buffer);
                cmd.or(Some(Command::ExecuteCommand(buffer)))
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.command_buffer.clear();
                Some(Command::EnterNormalMode)
            }
            KeyCode::Backspace => {
                self.command_buffer.pop();
                if self.command_buffer.is_empty() {
                    self.mode = Mode::Normal;
                    Some(Command::EnterNormalMode)
                } else {
                    None
                }
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
                None
            }
            _ => None,
        }
    }

    fn parse_command(&self) -> Option<Command> {
        let input = self.command_buffer.trim();

        if input == "q" || input == "quit" {
            return Some(Command::Quit);
        }
        if input == "help" {
            return Some(Command::ToggleHelp);
        }
        if input == "autoplay" {
            return Some(Command::ToggleAutoplay);
        }

        // Handle load command with potential quoted path
        if let Some(path) = input.strip_prefix("load ") {
            let path = path.trim();
            let path = if (path.starts_with('\'') && path.ends_with('\''))
                || (path.starts_with('"') && path.ends_with('"'))
            {
                // Remove surrounding quotes
                &path[1..path.len() - 1]
            } else {
                path
            };

            if !path.is_empty() {
                return Some(Command::LoadData(path.into()));
            }
        }

        // Handle theme command
        if let Some(name) = input.strip_prefix("theme ") {
            let name = name.trim();
            if !name.is_empty() {
                return Some(Command::SetTheme(name.to_string()));
            }
        }

        None
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.mode = Mode::Normal;
                Some(Command::ToggleHelp)
            }
            KeyCode::Char('j') | KeyCode::Down => Some(Command::HelpScrollDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Command::HelpScrollUp),
            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_command(handler: &mut InputHandler, text: &str) -> Option<Command> {
        handler.handle_key(key(KeyCode::Char(':')));
        for c in text.chars() {
            handler.handle_key(key(KeyCode::Char(c)));
        }
        handler.handle_key(key(KeyCode::Enter))
    }

    #[test]
    fn test_welcome_starts_on_enter_or_space() {
        let mut h = InputHandler::new();
        assert_eq!(h.handle_key(key(KeyCode::Enter)), Some(Command::Start));
        assert_eq!(h.handle_key(key(KeyCode::Char(' '))), Some(Command::Start));
    }

    #[test]
    fn test_welcome_ignores_show_keys() {
        let mut h = InputHandler::new();
        assert_eq!(h.handle_key(key(KeyCode::Char('j'))), None);
        assert_eq!(h.handle_key(key(KeyCode::Char('v'))), None);
        assert_eq!(h.handle_key(key(KeyCode::Char(':'))), None);
    }

    #[test]
    fn test_dedications_navigation() {
        let mut h = InputHandler::new();
        h.set_screen(Screen::Dedications);
        assert_eq!(h.handle_key(key(KeyCode::Char('j'))), Some(Command::SelectNext));
        assert_eq!(h.handle_key(key(KeyCode::Up)), Some(Command::SelectPrev));
        assert_eq!(h.handle_key(key(KeyCode::Char('G'))), Some(Command::SelectLast));
        assert_eq!(h.handle_key(key(KeyCode::Enter)), Some(Command::ActivateCard));
    }

    #[test]
    fn test_command_mode_quit() {
        let mut h = InputHandler::new();
        h.set_screen(Screen::Dedications);
        assert_eq!(type_command(&mut h, "q"), Some(Command::Quit));
        assert_eq!(h.mode(), Mode::Normal);
    }

    #[test]
    fn test_command_mode_load_quoted_path() {
        let mut h = InputHandler::new();
        h.set_screen(Screen::Dedications);
        let cmd = type_command(&mut h, "load \"/tmp/my dedications.json\"");
        assert_eq!(
            cmd,
            Some(Command::LoadData("/tmp/my dedications.json".into()))
        );
    }

    #[test]
    fn test_command_mode_theme() {
        let mut h = InputHandler::new();
        h.set_screen(Screen::Dedications);
        assert_eq!(
            type_command(&mut h, "theme midnight"),
            Some(Command::SetTheme("midnight".to_string()))
        );
    }

    #[test]
    fn test_unknown_command_passes_through() {
        let mut h = InputHandler::new();
        h.set_screen(Screen::Dedications);
        assert_eq!(
            type_command(&mut h, "frobnicate"),
            Some(Command::ExecuteCommand("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_backspace_to_empty_leaves_command_mode() {
        let mut h = InputHandler::new();
        h.set_screen(Screen::Dedications);
        h.handle_key(key(KeyCode::Char(':')));
        h.handle_key(key(KeyCode::Char('q')));
        // Deleting the last character exits command mode right away.
        assert_eq!(
            h.handle_key(key(KeyCode::Backspace)),
            Some(Command::EnterNormalMode)
        );
        assert_eq!(h.mode(), Mode::Normal);
        assert_eq!(h.command_buffer(), "");
    }

    #[test]
    fn test_help_mode_toggles_back() {
        let mut h = InputHandler::new();
        h.set_screen(Screen::Dedications);
        assert_eq!(h.handle_key(key(KeyCode::Char('?'))), Some(Command::ToggleHelp));
        assert_eq!(h.mode(), Mode::Help);
        assert_eq!(h.handle_key(key(KeyCode::Esc)), Some(Command::ToggleHelp));
        assert_eq!(h.mode(), Mode::Normal);
    }
}
