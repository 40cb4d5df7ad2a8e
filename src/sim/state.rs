//! Round state
//!
//! Everything that used to be ambient game state (score, timers, the bird,
//! the entity list) lives in one [`GameSession`], so independent sessions can
//! run side by side.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Entity, EntityKind, Layer};
use super::registry::{EntityId, EntityRegistry};
use crate::assets::{SpriteCatalog, SpriteHandle, SpriteKey};
use crate::settings::Settings;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Bird alive, world scrolling
    Playing,
    /// Waiting for a click (initial state too)
    GameOver,
}

/// Sprite handles resolved once at session creation
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSprites {
    pub bird: Option<SpriteHandle>,
    pub pipe_top: Option<SpriteHandle>,
    pub pipe_bottom: Option<SpriteHandle>,
    pub ground: Option<SpriteHandle>,
}

impl SessionSprites {
    pub fn from_catalog(catalog: &SpriteCatalog) -> Self {
        Self {
            bird: catalog.handle(SpriteKey::Bird),
            pipe_top: catalog.handle(SpriteKey::PipeTop),
            pipe_bottom: catalog.handle(SpriteKey::PipeBottom),
            ground: catalog.handle(SpriteKey::Ground),
        }
    }
}

/// One running game
#[derive(Debug, Clone)]
pub struct GameSession {
    pub settings: Settings,
    pub registry: EntityRegistry,
    pub phase: GamePhase,
    /// Seconds survived this round
    pub score: f32,
    /// Best score since the program started
    pub best_score: f32,
    /// Seconds until the next pipe pair
    pub pipe_timer: f32,
    /// Seconds until a click may restart after a game over
    pub cooldown: f32,
    /// Rounds started so far
    pub rounds: u32,
    pub bird: Option<EntityId>,
    pub ground: Option<[EntityId; 2]>,
    sprites: SessionSprites,
    seed: u64,
    rng: Pcg32,
}

impl GameSession {
    /// New session waiting for the first click. The first round may start
    /// right away (no cooldown).
    pub fn new(settings: Settings, catalog: &SpriteCatalog) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Session seed: {}", seed);

        let mut session = Self {
            pipe_timer: settings.pipe_spawn_time,
            settings,
            registry: EntityRegistry::new(),
            phase: GamePhase::GameOver,
            score: 0.0,
            best_score: 0.0,
            cooldown: 0.0,
            rounds: 0,
            bird: None,
            ground: None,
            sprites: SessionSprites::from_catalog(catalog),
            seed,
            rng: Pcg32::seed_from_u64(seed),
        };
        session.spawn_ground();
        session
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Score as shown on screen
    pub fn display_score(&self) -> u32 {
        self.score.max(0.0).floor() as u32
    }

    pub fn bird_entity(&self) -> Option<&Entity> {
        self.bird.and_then(|id| self.registry.get(id))
    }

    /// Start a fresh round
    pub fn restart(&mut self) {
        self.registry.destroy_layer(Layer::Foreground);
        self.registry.destroy_layer(Layer::Player);
        self.registry.compact();
        self.bird = None;
        self.ground = None;

        self.spawn_ground();
        self.score = 0.0;
        self.pipe_timer = self.settings.pipe_spawn_time;
        self.bird = Some(self.spawn_bird());
        self.cooldown = self.settings.game_over_cooldown;
        self.phase = GamePhase::Playing;
        self.rounds += 1;

        log::info!("Round {} started", self.rounds);
    }

    /// Enter GameOver. Calling it again while over does nothing.
    pub fn end_round(&mut self, reason: &str) {
        if self.is_game_over() {
            return;
        }
        self.phase = GamePhase::GameOver;
        if let Some(bird) = self.bird.take() {
            self.registry.destroy(bird);
        }
        self.best_score = self.best_score.max(self.score);
        log::info!(
            "Round {} over ({}), score {}, best {}",
            self.rounds,
            reason,
            self.display_score(),
            self.best_score.floor()
        );
    }

    /// Two ground strips tiled from the left edge
    pub fn spawn_ground(&mut self) {
        let sprite = self.sprites.ground;
        let height = sprite.map(|s| s.size.y).unwrap_or(0.0);
        let y = self.settings.height() - height;

        let first = Entity::ground(Vec2::new(0.0, y), sprite, self.settings.width());
        let tile_width = match first.kind {
            EntityKind::Ground { tile_width } => tile_width,
            _ => self.settings.width(),
        };
        let mut second = first.clone();
        second.set_position(Vec2::new(tile_width, y));
        second.refresh_rect();

        let a = self.registry.add(first);
        let b = self.registry.add(second);
        self.ground = Some([a, b]);
    }

    pub fn spawn_bird(&mut self) -> EntityId {
        let bird = Entity::bird(self.settings.bird_spawn(), self.sprites.bird);
        self.registry.add(bird)
    }

    /// Spawn a pipe pair at the right edge around a random gap centre
    pub fn spawn_pipe_pair(&mut self) -> (EntityId, EntityId) {
        let y_pos = self.rng.random_range(self.settings.gap_center_range()) as f32;
        self.spawn_pipe_pair_at(y_pos)
    }

    /// Top pipe ends `pipe_gap` above `y_pos`, bottom pipe starts `pipe_gap` below
    pub fn spawn_pipe_pair_at(&mut self, y_pos: f32) -> (EntityId, EntityId) {
        let x = self.settings.width();
        let gap = self.settings.pipe_gap;
        let lifetime = self.settings.pipe_lifetime;

        let top_height = self.sprites.pipe_top.map(|s| s.size.y).unwrap_or(0.0);
        let top = Entity::pipe(
            Vec2::new(x, y_pos - gap - top_height),
            self.sprites.pipe_top,
            lifetime,
        );
        let bottom = Entity::pipe(
            Vec2::new(x, y_pos + gap),
            self.sprites.pipe_bottom,
            lifetime,
        );

        log::debug!("Spawned pipe pair at x={} gap centre y={}", x, y_pos);
        (self.registry.add(top), self.registry.add(bottom))
    }
}
