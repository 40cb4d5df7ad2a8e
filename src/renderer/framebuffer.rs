//! Software framebuffer
//!
//! Game-space pixels (one per world unit), clipped to the window. Backends
//! such as the terminal present it; tests read it back directly.

use std::io;
use std::rc::Rc;

use glam::Vec2;

use super::{Renderer, font};
use crate::assets::{Rgb, Sprite, SpriteCatalog, SpriteHandle};
use crate::sim::Rect;

/// Below this a sprite is blitted unrotated
const ROTATION_EPSILON: f32 = 1e-3;

pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
    catalog: Rc<SpriteCatalog>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, catalog: Rc<SpriteCatalog>) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::default(); width as usize * height as usize],
            catalog,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel data
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Pixel at (x, y), `None` outside the frame
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Write one pixel; out-of-frame writes are dropped
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.set(px, py, color);
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn blit(pixels: &mut Framebuffer, sprite: &Sprite, origin: (i32, i32)) {
        for sy in 0..sprite.height() as i32 {
            for sx in 0..sprite.width() as i32 {
                if let Some(color) = sprite.pixel(sx, sy) {
                    pixels.set(origin.0 + sx, origin.1 + sy, color);
                }
            }
        }
    }

    /// Nearest-neighbour inverse mapping about the sprite centre
    fn blit_rotated(pixels: &mut Framebuffer, sprite: &Sprite, pos: Vec2, angle: f32) {
        let size = sprite.size();
        let half = size * 0.5;
        let centre = pos + half;
        let (sin, cos) = angle.sin_cos();

        let radius = size.length() * 0.5;
        let min = (centre - Vec2::splat(radius)).floor();
        let max = (centre + Vec2::splat(radius)).ceil();

        for dy in min.y as i32..max.y as i32 {
            for dx in min.x as i32..max.x as i32 {
                let p = Vec2::new(dx as f32 + 0.5, dy as f32 + 0.5) - centre;
                let sx = p.x * cos + p.y * sin + half.x;
                let sy = -p.x * sin + p.y * cos + half.y;
                if let Some(color) = sprite.pixel(sx.floor() as i32, sy.floor() as i32) {
                    pixels.set(dx, dy, color);
                }
            }
        }
    }
}

impl Renderer for Framebuffer {
    fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    fn draw_sprite(&mut self, sprite: SpriteHandle, pos: Vec2, angle: f32) {
        let catalog = Rc::clone(&self.catalog);
        let Some(sprite) = catalog.sprite(sprite.key) else {
            return;
        };
        if angle.abs() < ROTATION_EPSILON {
            let origin = pos.floor();
            Self::blit(self, sprite, (origin.x as i32, origin.y as i32));
        } else {
            Self::blit_rotated(self, sprite, pos, angle);
        }
    }

    fn draw_rect(&mut self, bounds: Rect, color: Rgb, stroke: u32) {
        if bounds.is_empty() || stroke == 0 {
            return;
        }
        let x0 = bounds.x.floor() as i32;
        let y0 = bounds.y.floor() as i32;
        let x1 = bounds.right().ceil() as i32;
        let y1 = bounds.bottom().ceil() as i32;
        let (w, h) = (x1 - x0, y1 - y0);
        let s = (stroke as i32).min(w).min(h);

        self.fill_rect(x0, y0, w, s, color);
        self.fill_rect(x0, y1 - s, w, s, color);
        self.fill_rect(x0, y0, s, h, color);
        self.fill_rect(x1 - s, y0, s, h, color);
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, color: Rgb) {
        let origin = pos.floor();
        font::rasterize(text, origin.x as i32, origin.y as i32, |x, y| {
            self.set(x, y, color)
        });
    }

    fn text_size(&self, text: &str) -> Vec2 {
        font::measure(text)
    }

    fn present(&mut self) -> io::Result<()> {
        Ok(())
    }
}
