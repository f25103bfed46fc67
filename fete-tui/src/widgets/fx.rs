//! Buffer-level effects - confetti overlay and screen fades
//!
//! Particles live on a virtual pixel surface scaled from the terminal
//! grid (8 px per column, 16 px per row, roughly a cell's aspect ratio).
//! Rendering maps them back onto cells and dims their color by opacity
//! using integer RGB math.

use fete_confetti::{Particle, Shape};
use ratatui::{buffer::Buffer, layout::Rect, style::Color};

/// Horizontal virtual pixels per terminal cell
pub const PX_PER_COL: f32 = 8.0;
/// Vertical virtual pixels per terminal cell
pub const PX_PER_ROW: f32 = 16.0;

/// Paint the live particle set over the buffer.
pub fn render_confetti(buf: &mut Buffer, area: Rect, particles: &[Particle]) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    for p in particles {
        if p.opacity <= 0.0 {
            continue;
        }

        let col = (p.x / PX_PER_COL) as i32;
        let row = (p.y / PX_PER_ROW) as i32;
        if col < 0 || row < 0 {
            continue;
        }
        let x = area.x + col as u16;
        let y = area.y + row as u16;
        if x >= area.x + area.width || y >= area.y + area.height {
            continue;
        }

        let glyph = particle_glyph(p);

        // Opacity as fixed-point dim: (channel * factor) >> 8
        let factor = (p.opacity.clamp(0.0, 1.0) * 256.0) as u16;
        let (r, g, b) = p.color;
        let r = ((r as u16 * factor) >> 8) as u8;
        let g = ((g as u16 * factor) >> 8) as u8;
        let b = ((b as u16 * factor) >> 8) as u8;

        let cell = &mut buf[(x, y)];
        cell.set_char(glyph);
        cell.set_style(cell.style().fg(Color::Rgb(r, g, b)));
    }
}

/// Glyph for a particle: shape picks the family, size picks the weight.
fn particle_glyph(p: &Particle) -> char {
    match p.shape {
        Shape::Rect => {
            if p.size >= 7.0 {
                '■'
            } else {
                '▪'
            }
        }
        Shape::Circle => {
            if p.size >= 7.0 {
                '●'
            } else {
                '•'
            }
        }
    }
}

/// Darken the whole buffer by a 0-256 fixed-point factor. Used for the
/// screen crossfade; 256 is a no-op, 0 is black.
pub fn apply_fade(buf: &mut Buffer, area: Rect, factor: u16) {
    if factor >= 256 || area.width == 0 || area.height == 0 {
        return;
    }

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            let cell = &mut buf[(x, y)];
            let style = cell.style();
            let mut next = style;
            if let Some(Color::Rgb(r, g, b)) = style.fg {
                next = next.fg(Color::Rgb(
                    ((r as u16 * factor) >> 8) as u8,
                    ((g as u16 * factor) >> 8) as u8,
                    ((b as u16 * factor) >> 8) as u8,
                ));
            }
            if let Some(Color::Rgb(r, g, b)) = style.bg {
                next = next.bg(Color::Rgb(
                    ((r as u16 * factor) >> 8) as u8,
                    ((g as u16 * factor) >> 8) as u8,
                    ((b as u16 * factor) >> 8) as u8,
                ));
            }
            cell.set_style(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fete_confetti::PALETTE;

    fn particle(x: f32, y: f32, opacity: f32) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            color: PALETTE[4], // white
            size: 8.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            shape: Shape::Circle,
            opacity,
        }
    }

    #[test]
    fn test_particle_lands_on_cell() {
        let area = Rect::new(0, 0, 10, 10);
        let mut buf = Buffer::empty(area);
        // Virtual (20, 35) maps to cell (2, 2).
        render_confetti(&mut buf, area, &[particle(20.0, 35.0, 1.0)]);
        assert_eq!(buf[(2u16, 2u16)].symbol(), "●");
        assert_eq!(buf[(0u16, 0u16)].symbol(), " ");
    }

    #[test]
    fn test_opacity_dims_color() {
        let area = Rect::new(0, 0, 4, 4);
        let mut buf = Buffer::empty(area);
        render_confetti(&mut buf, area, &[particle(0.0, 0.0, 0.5)]);
        match buf[(0u16, 0u16)].style().fg {
            Some(Color::Rgb(r, g, b)) => {
                assert!(r < 255 && g < 255 && b < 255);
                assert_eq!(r, g);
                assert_eq!(g, b);
            }
            other => panic!("expected dimmed rgb, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_bounds_particles_are_skipped() {
        let area = Rect::new(0, 0, 4, 4);
        let mut buf = Buffer::empty(area);
        render_confetti(
            &mut buf,
            area,
            &[particle(-10.0, 5.0, 1.0), particle(500.0, 500.0, 1.0)],
        );
        for y in 0..4u16 {
            for x in 0..4u16 {
                assert_eq!(buf[(x, y)].symbol(), " ");
            }
        }
    }

    #[test]
    fn test_fade_to_black() {
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        buf[(0u16, 0u16)].set_style(
            ratatui::style::Style::default().fg(Color::Rgb(200, 100, 50)),
        );
        apply_fade(&mut buf, area, 0);
        assert_eq!(buf[(0u16, 0u16)].style().fg, Some(Color::Rgb(0, 0, 0)));
    }

    #[test]
    fn test_full_factor_is_noop() {
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        buf[(0u16, 0u16)].set_style(
            ratatui::style::Style::default().fg(Color::Rgb(200, 100, 50)),
        );
        apply_fade(&mut buf, area, 256);
        assert_eq!(
            buf[(0u16, 0u16)].style().fg,
            Some(Color::Rgb(200, 100, 50))
        );
    }
}
