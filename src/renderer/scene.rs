//! Draw pass
//!
//! Reads a [`GameSession`] and issues renderer calls. Nothing here touches
//! simulation state.

use glam::Vec2;

use super::{Renderer, colors};
use crate::assets::Rgb;
use crate::sim::{Entity, GameSession};

/// Gap between the top edge and the score
const SCORE_MARGIN: f32 = 6.0;
const LINE_SPACING: f32 = 4.0;

/// Draw one entity: its sprite (if any), then optional debug bounds
pub fn draw_entity(entity: &Entity, renderer: &mut impl Renderer, debug_bounds: bool) {
    if let Some(sprite) = entity.sprite {
        renderer.draw_sprite(sprite, entity.position.floor(), entity.render_angle());
    }
    if debug_bounds {
        renderer.draw_rect(entity.rect, colors::DEBUG_BOUNDS, 1);
    }
}

/// Draw the world back to front, then the HUD on top
pub fn draw_session(session: &GameSession, renderer: &mut impl Renderer) {
    let debug_bounds = session.settings.debug_bounds;
    for (_, entity) in session.registry.iter() {
        draw_entity(entity, renderer, debug_bounds);
    }
    draw_hud(session, renderer);
}

fn draw_hud(session: &GameSession, renderer: &mut impl Renderer) {
    let width = session.settings.width();
    let height = session.settings.height();

    let score = session.display_score().to_string();
    let size = renderer.text_size(&score);
    shadowed_text(
        renderer,
        &score,
        Vec2::new(((width - size.x) * 0.5).floor(), SCORE_MARGIN),
        colors::TEXT,
    );

    if !session.is_game_over() {
        return;
    }

    let mut lines = Vec::with_capacity(3);
    if session.rounds > 0 {
        lines.push(("Game Over".to_string(), colors::TEXT));
    }
    lines.push(("Click To Start".to_string(), colors::PROMPT));
    if session.rounds > 0 {
        lines.push((
            format!("Best {}", session.best_score.max(0.0).floor() as u32),
            colors::TEXT,
        ));
    }

    let line_height = renderer.text_size("0").y + LINE_SPACING;
    let block = lines.len() as f32 * line_height - LINE_SPACING;
    let mut y = ((height - block) * 0.5).floor();
    for (text, color) in &lines {
        let size = renderer.text_size(text);
        shadowed_text(renderer, text, Vec2::new(((width - size.x) * 0.5).floor(), y), *color);
        y += line_height;
    }
}

fn shadowed_text(renderer: &mut impl Renderer, text: &str, pos: Vec2, color: Rgb) {
    renderer.draw_text(text, pos + Vec2::ONE, colors::TEXT_SHADOW);
    renderer.draw_text(text, pos, color);
}
