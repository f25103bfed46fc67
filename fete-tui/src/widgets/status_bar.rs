//! Status bar widget - mode indicator and command line

use crate::app::MessageType;
use crate::theme::Theme;
use fete_input::Mode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Widget for displaying the status bar with mode and command input
pub struct StatusBarWidget<'a> {
    mode: Mode,
    command_buffer: &'a str,
    message: Option<&'a str>,
    message_type: MessageType,
    autoplay: bool,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: Mode, command_buffer: &'a str, theme: &'a Theme) -> Self {
        Self {
            mode,
            command_buffer,
            message: None,
            message_type: MessageType::Info,
            autoplay: true,
            theme,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>, msg_type: MessageType) -> Self {
        self.message = msg;
        self.message_type = msg_type;
        self
    }

    pub fn autoplay(mut self, on: bool) -> Self {
        self.autoplay = on;
        self
    }

    fn mode_string(&self) -> (&'static str, Style) {
        match self.mode {
            Mode::Normal => ("NORMAL", self.theme.highlight()),
            Mode::Command => ("COMMAND", Style::from(self.theme.accent)),
            Mode::Help => ("HELP", self.theme.highlight()),
        }
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(10), // Mode indicator
            Constraint::Min(20),    // Command/message area
            Constraint::Length(14), // Autoplay flag
            Constraint::Length(22), // Help hint
        ])
        .split(area);

        // Mode indicator
        let (mode_text, mode_style) = self.mode_string();
        let mode_line = Line::from(vec![
            Span::raw("["),
            Span::styled(mode_text, mode_style),
            Span::raw("]"),
        ]);
        Paragraph::new(mode_line).render(chunks[0], buf);

        // Command/message area
        let content = if self.mode == Mode::Command {
            Line::from(vec![
                Span::styled(":", Style::from(self.theme.accent)),
                Span::styled(self.command_buffer, self.theme.normal()),
                Span::styled("█", self.theme.highlight()), // Cursor
            ])
        } else if let Some(msg) = self.message {
            let msg_style = match self.message_type {
                MessageType::Info => self.theme.dim(),
                MessageType::Success => Style::from(self.theme.accent),
                MessageType::Warning => Style::default().fg(self.theme.warning),
                MessageType::Error => Style::default().fg(self.theme.danger),
            };
            Line::from(Span::styled(msg, msg_style))
        } else {
            Line::from(Span::styled(
                "Ready. Press ? for help, : for commands",
                self.theme.dim(),
            ))
        };
        Paragraph::new(content).render(chunks[1], buf);

        // Autoplay flag
        let autoplay = if self.autoplay {
            Span::styled("[autoplay on]", Style::from(self.theme.accent))
        } else {
            Span::styled("[autoplay off]", self.theme.dim())
        };
        Paragraph::new(Line::from(autoplay)).render(chunks[2], buf);

        // Help hint
        let help = match self.mode {
            Mode::Normal => "j/k:cards  ?:help",
            Mode::Command => "Enter:run  Esc:cancel",
            Mode::Help => "Esc:close help",
        };
        let help_line = Line::from(Span::styled(help, self.theme.dim()));
        Paragraph::new(help_line).render(chunks[3], buf);
    }
}

/// Help overlay widget with scrolling support
pub struct HelpWidget<'a> {
    theme: &'a Theme,
    scroll: u16,
}

impl<'a> HelpWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme, scroll: 0 }
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    fn help_lines() -> Vec<&'static str> {
        vec![
            "╔══════════════════════════════════════════════════╗",
            "║              FETE - a little celebration          ║",
            "║                ↑/↓ or j/k to scroll               ║",
            "╠══════════════════════════════════════════════════╣",
            "║ CARDS                                             ║",
            "║   j / k         Move between cards                ║",
            "║   g / G         Jump to first / last card         ║",
            "║   Enter         Start the show from this card     ║",
            "╠───────────────────────────────────────────────────╣",
            "║ PLAYBACK                                          ║",
            "║   v             Play this card's greeting         ║",
            "║   s             Play this card's song             ║",
            "║   x             Stop whatever is playing          ║",
            "║   a             Toggle autoplay                   ║",
            "║   b             One more burst of confetti        ║",
            "╠───────────────────────────────────────────────────╣",
            "║ COMMANDS (:)                                      ║",
            "║   :load <path>        Load a dedication file      ║",
            "║   :theme <name>       fiesta/midnight/candlelight ║",
            "║   :autoplay           Toggle autoplay             ║",
            "║   :q                  Quit                        ║",
            "╠══════════════════════════════════════════════════╣",
            "║           Press Esc or ? to close help            ║",
            "╚══════════════════════════════════════════════════╝",
        ]
    }
}

impl Widget for HelpWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear background
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                buf[(x, y)].set_char(' ').set_style(self.theme.normal());
            }
        }

        let help_text = Self::help_lines();
        let total_lines = help_text.len() as u16;
        let visible_lines = area.height.min(total_lines);

        // Clamp scroll to valid range
        let max_scroll = total_lines.saturating_sub(visible_lines);
        let scroll = self.scroll.min(max_scroll);

        let start_x = area.x + area.width.saturating_sub(52) / 2;

        for (i, line) in help_text
            .iter()
            .skip(scroll as usize)
            .take(visible_lines as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }

            for (j, ch) in line.chars().enumerate() {
                let x = start_x + j as u16;
                if x >= area.x + area.width {
                    break;
                }

                let style = if matches!(ch, '║' | '╔' | '╗' | '╚' | '╝' | '═' | '╠' | '╣' | '─') {
                    self.theme.border()
                } else {
                    self.theme.normal()
                };

                buf[(x, y)].set_char(ch).set_style(style);
            }
        }

        // Show scroll indicator if content is scrollable
        if total_lines > visible_lines {
            let indicator = format!(" [{}/{}] ", scroll + 1, max_scroll + 1);
            let indicator_x = area.x + area.width.saturating_sub(indicator.len() as u16 + 2);
            let indicator_y = area.y + area.height - 1;

            for (i, ch) in indicator.chars().enumerate() {
                let x = indicator_x + i as u16;
                if x < area.x + area.width {
                    buf[(x, indicator_y)]
                        .set_char(ch)
                        .set_style(self.theme.dim());
                }
            }
        }
    }
}
