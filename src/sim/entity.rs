//! Entities: one record shape for everything in the world
//!
//! Bird, pipe and ground differ only in their [`EntityKind`] tag; behaviour is
//! dispatched by matching on it in [`update`].

use glam::Vec2;

use super::collision::Rect;
use crate::assets::SpriteHandle;
use crate::consts::BIRD_TURN_RATE;
use crate::lerp;
use crate::settings::Settings;

/// Update/draw ordering bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Foreground,
    Player,
}

impl Layer {
    /// Processing order, back to front
    pub const ALL: [Layer; 3] = [Layer::Background, Layer::Foreground, Layer::Player];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Layer::Background => 0,
            Layer::Foreground => 1,
            Layer::Player => 2,
        }
    }
}

/// Player-controlled state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bird {
    pub velocity: Vec2,
    /// Render-only heading (radians, y-down), eased toward the velocity angle
    pub angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    Bird(Bird),
    /// Top or bottom half of a pair; the halves behave identically
    Pipe,
    /// Scrolling floor strip; `tile_width` is the wrap distance
    Ground { tile_width: f32 },
}

/// Anything that lives in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub position: Vec2,
    /// Derived from `position` and the sprite size on every update
    pub rect: Rect,
    pub sprite: Option<SpriteHandle>,
    pub layer: Layer,
    /// Seconds left to live; zero or less means forever
    pub lifetime: f32,
    pub kind: EntityKind,
}

impl Entity {
    fn new(kind: EntityKind, layer: Layer, position: Vec2, sprite: Option<SpriteHandle>) -> Self {
        let mut entity = Self {
            position,
            rect: Rect::default(),
            sprite,
            layer,
            lifetime: 0.0,
            kind,
        };
        entity.refresh_rect();
        entity
    }

    pub fn bird(position: Vec2, sprite: Option<SpriteHandle>) -> Self {
        Self::new(EntityKind::Bird(Bird::default()), Layer::Player, position, sprite)
    }

    pub fn pipe(position: Vec2, sprite: Option<SpriteHandle>, lifetime: f32) -> Self {
        let mut pipe = Self::new(EntityKind::Pipe, Layer::Foreground, position, sprite);
        pipe.lifetime = lifetime;
        pipe
    }

    /// Ground strip; without a sprite it still tiles every `fallback_width` pixels
    pub fn ground(position: Vec2, sprite: Option<SpriteHandle>, fallback_width: f32) -> Self {
        let tile_width = sprite.map(|s| s.size.x).unwrap_or(fallback_width);
        Self::new(EntityKind::Ground { tile_width }, Layer::Foreground, position, sprite)
    }

    /// Sprite size, zero when spriteless
    pub fn size(&self) -> Vec2 {
        self.sprite.map(|s| s.size).unwrap_or(Vec2::ZERO)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Recompute the bounding box from the current position
    pub fn refresh_rect(&mut self) {
        self.rect = Rect::from_pos_size(self.position, self.size());
    }

    /// Pipes and ground kill the bird on contact
    pub fn is_lethal(&self) -> bool {
        matches!(self.kind, EntityKind::Pipe | EntityKind::Ground { .. })
    }

    pub fn as_bird(&self) -> Option<&Bird> {
        match &self.kind {
            EntityKind::Bird(bird) => Some(bird),
            _ => None,
        }
    }

    /// Angle to draw the sprite at
    pub fn render_angle(&self) -> f32 {
        self.as_bird().map(|b| b.angle).unwrap_or(0.0)
    }
}

/// Per-tick inputs shared by every entity update
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    pub dt: f32,
    /// A click happened this frame
    pub clicked: bool,
    pub game_over: bool,
    pub settings: &'a Settings,
}

/// What an entity asks of its owner after updating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Signal {
    None,
    /// Remove me
    Destroy,
    /// End the round
    GameOver,
}

/// Advance one entity by `ctx.dt`
pub fn update(entity: &mut Entity, ctx: &UpdateContext) -> Signal {
    let mut signal = match &mut entity.kind {
        EntityKind::Bird(bird) => update_bird(bird, &mut entity.position, ctx),
        EntityKind::Pipe => {
            entity.position.x -= ctx.settings.pipe_speed * ctx.dt;
            // Scrolled fully past the left edge
            if entity.position.x + entity.sprite.map(|s| s.size.x).unwrap_or(0.0) < 0.0 {
                Signal::Destroy
            } else {
                Signal::None
            }
        }
        // Scrolled by the session as a pair, see `scroll_ground`
        EntityKind::Ground { .. } => Signal::None,
    };

    if entity.lifetime > 0.0 {
        entity.lifetime -= ctx.dt;
        if entity.lifetime <= 0.0 && signal == Signal::None {
            signal = Signal::Destroy;
        }
    }

    entity.refresh_rect();
    signal
}

/// Impulse, then gravity, then integration, then bounds check
fn update_bird(bird: &mut Bird, position: &mut Vec2, ctx: &UpdateContext) -> Signal {
    if ctx.clicked && !ctx.game_over {
        bird.velocity.y = ctx.settings.bird_impulse;
    }

    bird.velocity.y += ctx.settings.gravity * ctx.dt;
    *position += bird.velocity * ctx.dt;

    let target = bird.velocity.y.atan2(bird.velocity.x);
    bird.angle = lerp(bird.angle, target, (BIRD_TURN_RATE * ctx.dt).min(1.0));

    // Above the ceiling, or below the window when there is no ground to land on
    if position.y <= 0.0 || position.y >= ctx.settings.height() {
        Signal::GameOver
    } else {
        Signal::None
    }
}

/// Scroll both ground strips by `dx` and wrap whichever has left the screen
/// to sit right behind its twin.
pub fn scroll_ground(a: &mut Entity, b: &mut Entity, dx: f32) {
    a.position.x += dx;
    b.position.x += dx;

    let width_of = |e: &Entity| match e.kind {
        EntityKind::Ground { tile_width } => tile_width,
        _ => e.size().x,
    };
    let (wa, wb) = (width_of(a), width_of(b));

    if a.position.x + wa <= 0.0 {
        a.position.x = b.position.x + wb;
    }
    if b.position.x + wb <= 0.0 {
        b.position.x = a.position.x + wa;
    }

    a.refresh_rect();
    b.refresh_rect();
}
