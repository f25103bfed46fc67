//! Dedication card list widget

use crate::app::{CardVisual, PlaybackInfo};
use crate::theme::Theme;
use fete_audio::ClipKind;
use fete_library::{initials, Dedication};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Rows each card occupies, border included
const CARD_HEIGHT: u16 = 6;

/// State for the card list: the dedications plus selection, scroll,
/// and per-card animation flags.
#[derive(Debug, Clone, Default)]
pub struct CardListState {
    pub dedications: Vec<Dedication>,
    pub selected: usize,
    pub scroll_offset: usize,
    pub visuals: Vec<CardVisual>,
}

impl CardListState {
    /// Replace the dedication set, resetting selection and visuals
    pub fn set_dedications(&mut self, dedications: Vec<Dedication>) {
        self.visuals = vec![CardVisual::default(); dedications.len()];
        self.dedications = dedications;
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn len(&self) -> usize {
        self.dedications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dedications.is_empty()
    }

    /// Get the currently selected dedication
    pub fn selected_dedication(&self) -> Option<&Dedication> {
        self.dedications.get(self.selected)
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        if !self.dedications.is_empty() && self.selected < self.dedications.len() - 1 {
            self.selected += 1;
        }
    }

    /// Move selection up
    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Move selection to first card
    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    /// Move selection to last card
    pub fn select_last(&mut self) {
        if !self.dedications.is_empty() {
            self.selected = self.dedications.len() - 1;
        }
    }

    /// Mark one card as now playing, unmarking every other card.
    pub fn set_highlight(&mut self, index: usize) {
        for (i, v) in self.visuals.iter_mut().enumerate() {
            v.now_playing = i == index;
        }
    }

    /// Remove the now-playing mark from all cards
    pub fn clear_highlights(&mut self) {
        for v in self.visuals.iter_mut() {
            v.now_playing = false;
        }
    }

    pub fn now_playing_card(&self) -> Option<usize> {
        self.visuals.iter().position(|v| v.now_playing)
    }

    /// Start the end-of-clip flash on one card's media element
    pub fn trigger_reset_flash(&mut self, index: usize, kind: ClipKind) {
        const FLASH_FRAMES: u8 = 8;
        if let Some(v) = self.visuals.get_mut(index) {
            match kind {
                ClipKind::Greeting => v.greeting_flash = FLASH_FRAMES,
                ClipKind::Song => v.song_flash = FLASH_FRAMES,
            }
        }
    }

    /// Decay all running flashes (call each frame)
    pub fn update_flashes(&mut self) {
        for v in self.visuals.iter_mut() {
            v.greeting_flash = v.greeting_flash.saturating_sub(1);
            v.song_flash = v.song_flash.saturating_sub(1);
        }
    }

    /// Update scroll offset to keep selection visible
    fn update_scroll(&mut self, visible_cards: usize) {
        if visible_cards == 0 {
            return;
        }
        if self.selected >= self.scroll_offset + visible_cards {
            self.scroll_offset = self.selected - visible_cards + 1;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        }
    }
}

/// Widget rendering the dedication cards as a scrolling vertical list
pub struct CardsWidget<'a> {
    state: &'a mut CardListState,
    theme: &'a Theme,
    playback: Option<PlaybackInfo>,
}

impl<'a> CardsWidget<'a> {
    pub fn new(state: &'a mut CardListState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            playback: None,
        }
    }

    pub fn playback(mut self, playback: Option<PlaybackInfo>) -> Self {
        self.playback = playback;
        self
    }

    fn render_card(&self, index: usize, area: Rect, buf: &mut Buffer) {
        let dedication = &self.state.dedications[index];
        let visual = self.state.visuals.get(index).copied().unwrap_or_default();
        let theme = self.theme;

        let border_style = if visual.now_playing {
            theme.border_playing()
        } else if index == self.state.selected {
            theme.border_selected()
        } else {
            theme.border()
        };

        let title = if visual.now_playing {
            Line::from(Span::styled(" ♪ now playing ", theme.border_playing()))
        } else {
            Line::default()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::with_capacity(4);

        // Badge and name. The badge shows a photo marker when a portrait
        // is set, otherwise derived initials.
        let badge_text = match dedication.photo {
            Some(_) => " ◉ ".to_string(),
            None => format!(" {} ", initials(&dedication.name)),
        };
        lines.push(Line::from(vec![
            Span::styled(badge_text, theme.badge()),
            Span::raw(" "),
            Span::styled(dedication.name.clone(), theme.title()),
        ]));

        // Greeting element: one line, video wins over voice.
        if dedication.has_greeting() {
            let label = if dedication.video_message.is_some() {
                "▶ video greeting"
            } else {
                "▶ voice greeting"
            };
            let style = if visual.flash_for(ClipKind::Greeting) > 0 {
                theme.highlight()
            } else if self.is_playing(index, ClipKind::Greeting) {
                theme.border_playing()
            } else {
                theme.normal()
            };
            lines.push(Line::from(Span::styled(label, style)));
        }

        // Song element: title/artist, then a link or a progress line.
        if let Some(ref song) = dedication.song {
            let style = if visual.flash_for(ClipKind::Song) > 0 {
                theme.highlight()
            } else if self.is_playing(index, ClipKind::Song) {
                theme.border_playing()
            } else {
                theme.normal()
            };
            lines.push(Line::from(vec![
                Span::styled("♫ ", theme.dim()),
                Span::styled(format!("{} — {}", song.title, song.artist), style),
            ]));

            if dedication.has_local_song() {
                lines.push(self.progress_line(index, inner.width));
            } else if let Some(ref url) = song.spotify_url {
                lines.push(Line::from(Span::styled(url.clone(), theme.link())));
            }
        }

        Paragraph::new(lines)
            .style(theme.normal())
            .render(inner, buf);
    }

    fn is_playing(&self, card: usize, kind: ClipKind) -> bool {
        self.playback
            .is_some_and(|p| p.card == card && p.kind == kind)
    }

    /// Player bar for a locally playable song
    fn progress_line(&self, index: usize, width: u16) -> Line<'static> {
        let theme = self.theme;
        let playing = self
            .playback
            .filter(|p| p.card == index && p.kind == ClipKind::Song);

        let Some(p) = playing else {
            return Line::from(Span::styled("  ── press s to play ──", theme.dim()));
        };

        let fraction = if p.duration_secs > 0.0 {
            (p.position_secs / p.duration_secs).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };
        let bar_width = width.saturating_sub(14).max(4) as usize;
        let filled = (fraction * bar_width as f32) as usize;
        let bar: String = "█".repeat(filled) + &"─".repeat(bar_width - filled);

        Line::from(vec![
            Span::styled(format_time(p.position_secs), theme.dim()),
            Span::raw(" "),
            Span::styled(bar, theme.progress_style(fraction)),
            Span::raw(" "),
            Span::styled(format_time(p.duration_secs), theme.dim()),
        ])
    }
}

impl Widget for CardsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < CARD_HEIGHT || self.state.is_empty() {
            let empty = Paragraph::new("No dedications to show")
                .style(self.theme.dim())
                .centered();
            empty.render(area, buf);
            return;
        }

        let visible = (area.height / CARD_HEIGHT) as usize;
        self.state.update_scroll(visible);

        let start = self.state.scroll_offset;
        let end = (start + visible).min(self.state.len());

        for (slot, index) in (start..end).enumerate() {
            let card_area = Rect::new(
                area.x,
                area.y + (slot as u16) * CARD_HEIGHT,
                area.width,
                CARD_HEIGHT,
            );
            self.render_card(index, card_area, buf);
        }

        // Scroll hint when cards overflow the viewport
        if self.state.len() > visible {
            let hint = format!(" {}-{} of {} ", start + 1, end, self.state.len());
            let x = area.x + area.width.saturating_sub(hint.len() as u16 + 2);
            let y = area.y + area.height - 1;
            for (i, ch) in hint.chars().enumerate() {
                let cx = x + i as u16;
                if cx < area.x + area.width {
                    buf[(cx, y)].set_char(ch).set_style(self.theme.dim());
                }
            }
        }
    }
}

fn format_time(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fete_library::sample_dedications;

    fn state() -> CardListState {
        let mut s = CardListState::default();
        s.set_dedications(sample_dedications());
        s
    }

    #[test]
    fn test_selection_bounds() {
        let mut s = state();
        s.select_prev();
        assert_eq!(s.selected, 0);
        s.select_last();
        assert_eq!(s.selected, 2);
        s.select_next();
        assert_eq!(s.selected, 2);
        s.select_first();
        assert_eq!(s.selected, 0);
    }

    #[test]
    fn test_highlight_is_unique() {
        let mut s = state();
        s.set_highlight(0);
        s.set_highlight(2);
        let marked: Vec<usize> = s
            .visuals
            .iter()
            .enumerate()
            .filter(|(_, v)| v.now_playing)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(marked, vec![2]);
        s.clear_highlights();
        assert_eq!(s.now_playing_card(), None);
    }

    #[test]
    fn test_flash_decays() {
        let mut s = state();
        s.trigger_reset_flash(1, ClipKind::Greeting);
        assert!(s.visuals[1].greeting_flash > 0);
        for _ in 0..20 {
            s.update_flashes();
        }
        assert_eq!(s.visuals[1].greeting_flash, 0);
        assert_eq!(s.visuals[1].song_flash, 0);
    }

    #[test]
    fn test_scroll_follows_selection() {
        let mut s = CardListState::default();
        let many: Vec<Dedication> = (0..10)
            .flat_map(|_| sample_dedications())
            .collect();
        s.set_dedications(many);

        s.select_last();
        s.update_scroll(4);
        assert_eq!(s.scroll_offset, s.selected - 3);

        s.select_first();
        s.update_scroll(4);
        assert_eq!(s.scroll_offset, 0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.4), "1:05");
        assert_eq!(format_time(-1.0), "0:00");
    }
}
