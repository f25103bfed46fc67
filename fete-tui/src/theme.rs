//! Color themes for FETE

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    /// Primary foreground color (text, borders)
    pub fg: Color,
    /// Dimmed foreground (secondary text)
    pub fg_dim: Color,
    /// Background color
    pub bg: Color,
    /// Highlight color (selected items, active elements)
    pub highlight: Color,
    /// Accent color (badges, progress bars)
    pub accent: Color,
    /// Warning color
    pub warning: Color,
    /// Error/danger color
    pub danger: Color,
    /// Now-playing card border
    pub playing: Color,
    /// Streaming link text
    pub link: Color,
}

impl Theme {
    /// Get style for normal text
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get style for dimmed text
    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Get style for highlighted/selected items
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for borders
    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Get style for the selected card's border
    pub fn border_selected(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    /// Get style for the now-playing card's border
    pub fn border_playing(&self) -> Style {
        Style::default()
            .fg(self.playing)
            .add_modifier(Modifier::BOLD)
    }

    /// Get title style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for an initials badge
    pub fn badge(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for streaming links
    pub fn link(&self) -> Style {
        Style::default()
            .fg(self.link)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Get style for progress bars based on completion (0.0 - 1.0)
    pub fn progress_style(&self, fraction: f32) -> Style {
        let color = if fraction > 0.95 {
            self.fg_dim
        } else {
            self.accent
        };
        Style::default().fg(color)
    }
}

/// Warm party theme matching the confetti palette
pub const FIESTA: Theme = Theme {
    name: "fiesta",
    fg: Color::Rgb(255, 240, 245),      // warm white
    fg_dim: Color::Rgb(150, 110, 125),  // muted rose
    bg: Color::Rgb(25, 10, 18),         // deep plum
    highlight: Color::Rgb(232, 93, 117), // party pink
    accent: Color::Rgb(249, 168, 37),   // gold
    warning: Color::Rgb(255, 217, 90),  // light gold
    danger: Color::Rgb(255, 80, 80),    // red
    playing: Color::Rgb(255, 123, 147), // light pink
    link: Color::Rgb(100, 181, 246),    // light blue
};

/// Cool nighttime theme
pub const MIDNIGHT: Theme = Theme {
    name: "midnight",
    fg: Color::Rgb(220, 230, 255),      // cool white
    fg_dim: Color::Rgb(95, 110, 150),   // slate
    bg: Color::Rgb(8, 10, 25),          // near-black blue
    highlight: Color::Rgb(100, 181, 246), // light blue
    accent: Color::Rgb(186, 104, 200),  // purple
    warning: Color::Rgb(255, 217, 90),  // light gold
    danger: Color::Rgb(255, 90, 90),    // red
    playing: Color::Rgb(140, 200, 255), // pale blue
    link: Color::Rgb(130, 200, 255),    // sky
};

/// Soft amber theme
pub const CANDLELIGHT: Theme = Theme {
    name: "candlelight",
    fg: Color::Rgb(255, 235, 200),      // cream
    fg_dim: Color::Rgb(150, 115, 70),   // dim amber
    bg: Color::Rgb(22, 14, 5),          // dark brown
    highlight: Color::Rgb(255, 176, 0), // amber
    accent: Color::Rgb(255, 200, 100),  // light amber
    warning: Color::Rgb(255, 255, 120), // yellow
    danger: Color::Rgb(255, 100, 100),  // red
    playing: Color::Rgb(255, 210, 130), // glow
    link: Color::Rgb(150, 190, 255),    // blue for contrast
};

impl Default for Theme {
    fn default() -> Self {
        FIESTA
    }
}
