//! Terminal presenter
//!
//! Draws into a [`Framebuffer`] and shows it with `crossterm`: each cell holds
//! two stacked pixels using the upper half block (foreground = top pixel,
//! background = bottom pixel). Frames larger than the terminal are scaled
//! down with nearest-neighbour sampling.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color},
    terminal::{self, ClearType},
};
use glam::Vec2;

use super::{Framebuffer, Renderer};
use crate::assets::{Rgb, SpriteHandle};
use crate::sim::Rect;

const UPPER_HALF_BLOCK: char = '\u{2580}';

/// Where and how large the frame appears on the terminal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Framebuffer pixels per terminal pixel (>= 1)
    pub scale: f32,
    /// Size in cells
    pub cols: u16,
    pub rows: u16,
    /// Top-left cell
    pub col: u16,
    pub row: u16,
}

impl Layout {
    /// Fit a `frame` (pixels) into a `term` (cells). `window_position` is in
    /// terminal pixels (one per column, two per row) and is used when the
    /// whole frame fits there; otherwise the frame is centred.
    pub fn fit(frame: (u32, u32), term: (u16, u16), window_position: (u32, u32)) -> Self {
        let (w, h) = (frame.0.max(1) as f32, frame.1.max(1) as f32);
        let avail_w = term.0.max(1) as f32;
        let avail_h = term.1.max(1) as f32 * 2.0;
        let scale = (w / avail_w).max(h / avail_h).max(1.0);

        let px_w = (w / scale).floor().max(1.0) as u16;
        let px_h = (h / scale).floor().max(1.0) as u16;
        let cols = px_w.min(term.0);
        let rows = px_h.div_ceil(2).min(term.1);

        let (x, y) = window_position;
        let fits = x as u64 + cols as u64 <= term.0 as u64
            && (y / 2) as u64 + rows as u64 <= term.1 as u64;
        let (col, row) = if fits {
            (x as u16, (y / 2) as u16)
        } else {
            (term.0.saturating_sub(cols) / 2, term.1.saturating_sub(rows) / 2)
        };

        Self {
            scale,
            cols,
            rows,
            col,
            row,
        }
    }

    /// Framebuffer pixel shown at terminal pixel (x, y)
    #[inline]
    fn source(&self, x: u16, y: u16) -> (i32, i32) {
        (
            (x as f32 * self.scale) as i32,
            (y as f32 * self.scale) as i32,
        )
    }
}

pub struct TerminalRenderer<W: Write> {
    frame: Framebuffer,
    out: W,
    term_size: (u16, u16),
    window_position: (u32, u32),
    needs_clear: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(frame: Framebuffer, out: W, term_size: (u16, u16), window_position: (u32, u32)) -> Self {
        Self {
            frame,
            out,
            term_size,
            window_position,
            needs_clear: true,
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::fit(
            (self.frame.width(), self.frame.height()),
            self.term_size,
            self.window_position,
        )
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self) -> io::Result<()> {
        let layout = self.layout();
        let frame = &self.frame;
        let out = &mut self.out;

        if self.needs_clear {
            queue!(out, style::ResetColor, terminal::Clear(ClearType::All))?;
            self.needs_clear = false;
        }

        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;
        for row in 0..layout.rows {
            queue!(out, cursor::MoveTo(layout.col, layout.row + row))?;
            for col in 0..layout.cols {
                let (tx, ty) = layout.source(col, row * 2);
                let (bx, by) = layout.source(col, row * 2 + 1);
                let Some(top) = frame.pixel(tx, ty) else {
                    continue;
                };
                let bottom = frame.pixel(bx, by).unwrap_or(top);

                if top == bottom {
                    if bg != Some(top) {
                        queue!(out, style::SetBackgroundColor(color(top)))?;
                        bg = Some(top);
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if fg != Some(top) {
                        queue!(out, style::SetForegroundColor(color(top)))?;
                        fg = Some(top);
                    }
                    if bg != Some(bottom) {
                        queue!(out, style::SetBackgroundColor(color(bottom)))?;
                        bg = Some(bottom);
                    }
                    queue!(out, style::Print(UPPER_HALF_BLOCK))?;
                }
            }
            queue!(out, style::ResetColor)?;
            fg = None;
            bg = None;
        }
        out.flush()
    }
}

#[inline]
fn color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn clear(&mut self, color: Rgb) {
        self.frame.clear(color);
    }

    fn draw_sprite(&mut self, sprite: SpriteHandle, pos: Vec2, angle: f32) {
        self.frame.draw_sprite(sprite, pos, angle);
    }

    fn draw_rect(&mut self, bounds: Rect, color: Rgb, stroke: u32) {
        self.frame.draw_rect(bounds, color, stroke);
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, color: Rgb) {
        self.frame.draw_text(text, pos, color);
    }

    fn text_size(&self, text: &str) -> Vec2 {
        self.frame.text_size(text)
    }

    fn present(&mut self) -> io::Result<()> {
        self.write_frame()
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        log::debug!("Terminal resized to {}x{}", cols, rows);
        self.term_size = (cols, rows);
        self.needs_clear = true;
    }
}
