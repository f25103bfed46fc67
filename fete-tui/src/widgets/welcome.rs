//! Welcome screen widget

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

const BANNER: [&str; 5] = [
    "╔═══════════════════════════════════╗",
    "║                                   ║",
    "║      A  C E L E B R A T I O N     ║",
    "║                                   ║",
    "╚═══════════════════════════════════╝",
];

/// Full-screen welcome view with the one-shot start control
pub struct WelcomeWidget<'a> {
    theme: &'a Theme,
    start_disabled: bool,
    frame_count: u64,
}

impl<'a> WelcomeWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            start_disabled: false,
            frame_count: 0,
        }
    }

    /// Dim the start control once it has fired
    pub fn start_disabled(mut self, disabled: bool) -> Self {
        self.start_disabled = disabled;
        self
    }

    pub fn frame_count(mut self, frame_count: u64) -> Self {
        self.frame_count = frame_count;
        self
    }
}

impl Widget for WelcomeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let mut lines: Vec<Line> = Vec::new();

        let top_pad = area.height.saturating_sub(BANNER.len() as u16 + 4) / 2;
        for _ in 0..top_pad {
            lines.push(Line::default());
        }

        for row in BANNER {
            lines.push(Line::from(Span::styled(row, theme.title())).centered());
        }
        lines.push(Line::default());

        let prompt = if self.start_disabled {
            Line::from(Span::styled("· here we go ·", theme.dim())).centered()
        } else {
            // Gentle blink to draw the eye
            let style = if (self.frame_count / 15) % 2 == 0 {
                theme.highlight()
            } else {
                theme.normal()
            };
            Line::from(Span::styled("  Press Enter to begin  ", style)).centered()
        };
        lines.push(prompt);
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("q to leave quietly", theme.dim())).centered());

        Paragraph::new(lines).style(theme.normal()).render(area, buf);
    }
}
