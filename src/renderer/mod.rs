//! Rendering
//!
//! The simulation never draws. A [`Renderer`] consumes positions and sprite
//! handles; [`scene`] walks a session and issues the calls.

pub mod font;
pub mod framebuffer;
pub mod scene;
pub mod terminal;

use std::io;

use glam::Vec2;

use crate::assets::{Rgb, SpriteHandle};
use crate::sim::Rect;

pub use framebuffer::Framebuffer;
pub use terminal::TerminalRenderer;

/// Drawing capability consumed by the game
pub trait Renderer {
    /// Fill the whole frame
    fn clear(&mut self, color: Rgb);

    /// Draw a sprite with its top-left at `pos`, rotated by `angle` radians
    /// (clockwise on screen) about its centre
    fn draw_sprite(&mut self, sprite: SpriteHandle, pos: Vec2, angle: f32);

    /// Stroke a rectangle outline `stroke` pixels wide
    fn draw_rect(&mut self, bounds: Rect, color: Rgb, stroke: u32);

    /// Draw text with its top-left at `pos`
    fn draw_text(&mut self, text: &str, pos: Vec2, color: Rgb);

    /// Size `text` would occupy
    fn text_size(&self, text: &str) -> Vec2;

    /// Show the finished frame
    fn present(&mut self) -> io::Result<()>;

    /// The output surface changed size (terminal cells)
    fn resize(&mut self, _cols: u16, _rows: u16) {}
}

/// Colors for game elements
pub mod colors {
    use crate::assets::Rgb;

    pub const BACKGROUND: Rgb = Rgb(10, 10, 30);
    pub const DEBUG_BOUNDS: Rgb = Rgb(255, 0, 0);
    pub const TEXT: Rgb = Rgb(255, 255, 255);
    pub const TEXT_SHADOW: Rgb = Rgb(30, 30, 30);
    pub const PROMPT: Rgb = Rgb(245, 200, 66);
}
