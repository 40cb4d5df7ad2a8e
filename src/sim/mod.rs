//! Simulation module
//!
//! All gameplay logic lives here. No rendering or platform dependencies:
//! - Time only advances through `tick(dt)`
//! - Seeded RNG only
//! - Stable iteration order (layer, then insertion)
//! - Collisions happen in the update pass, never while drawing

pub mod collision;
pub mod entity;
pub mod registry;
pub mod state;
pub mod tick;

/// 2D position/velocity
pub use glam::Vec2 as Vector2;

pub use collision::{Rect, lethal_contact};
pub use entity::{Bird, Entity, EntityKind, Layer, Signal, UpdateContext};
pub use registry::{EntityId, EntityRegistry};
pub use state::{GamePhase, GameSession, SessionSprites};
pub use tick::{TickInput, tick};
