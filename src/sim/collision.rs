//! Axis-aligned bounds and lethal-contact detection
//!
//! Every collider in the game is an upright rectangle, so overlap is a plain
//! interval test on both axes. Zero-size boxes (spriteless entities) never
//! overlap anything.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::registry::{EntityId, EntityRegistry};

/// Axis-aligned rectangle, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// True if the two rectangles share interior area.
    ///
    /// Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Find the first live lethal entity overlapping `target`.
///
/// The result only says whether (and with what) contact happened; scanning
/// order has no effect on the outcome of a tick.
pub fn lethal_contact(registry: &EntityRegistry, target: &Rect) -> Option<EntityId> {
    registry
        .iter()
        .find(|(_, entity)| entity.is_lethal() && entity.rect.intersects(target))
        .map(|(id, _)| id)
}
