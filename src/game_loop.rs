//! Frame driver
//!
//! One iteration: poll input, clear, simulate, draw, present, then sleep out
//! the rest of the frame. Quitting takes effect after the current frame.

use std::io;

use crate::platform::{Clock, FrameInput, FrameLimiter, InputSource};
use crate::renderer::{Renderer, colors, scene};
use crate::sim::{GameSession, TickInput, tick};

/// Simulate and render a single frame
pub fn run_frame(
    session: &mut GameSession,
    renderer: &mut impl Renderer,
    input: &FrameInput,
    dt: f32,
) -> io::Result<()> {
    if let Some((cols, rows)) = input.resized {
        renderer.resize(cols, rows);
    }
    renderer.clear(colors::BACKGROUND);
    tick(
        session,
        &TickInput {
            clicked: input.clicked,
        },
        dt,
    );
    scene::draw_session(session, renderer);
    renderer.present()
}

pub struct GameLoop<I, C, R> {
    session: GameSession,
    input: I,
    clock: C,
    renderer: R,
    limiter: FrameLimiter,
    frames: u64,
}

impl<I: InputSource, C: Clock, R: Renderer> GameLoop<I, C, R> {
    pub fn new(session: GameSession, input: I, clock: C, renderer: R) -> Self {
        let limiter = FrameLimiter::from_settings(&session.settings);
        Self {
            session,
            input,
            clock,
            renderer,
            limiter,
            frames: 0,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Frames completed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame. Returns false once quit has been requested.
    pub fn frame(&mut self) -> io::Result<bool> {
        let input = self.input.poll()?;
        let dt = self.limiter.begin(&self.clock);
        run_frame(&mut self.session, &mut self.renderer, &input, dt)?;
        self.frames += 1;
        self.limiter.end(&mut self.clock);
        Ok(!input.quit_requested)
    }

    /// Run until quit; returns the number of frames shown
    pub fn run(&mut self) -> io::Result<u64> {
        log::info!(
            "Game loop started at {} fps (seed {})",
            self.session.settings.fps,
            self.session.seed()
        );
        while self.frame()? {}
        log::info!(
            "Game loop stopped after {} frames, best score {}",
            self.frames,
            self.session.best_score.floor()
        );
        Ok(self.frames)
    }
}
