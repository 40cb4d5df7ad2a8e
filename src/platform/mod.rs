//! Platform capabilities
//!
//! The game loop only talks to these traits:
//! - [`InputSource`]: events collapsed to one [`FrameInput`] per frame
//! - [`Clock`]: monotonic time and sleeping
//!
//! [`FrameLimiter`] turns a clock into frame deltas and caps the frame rate.
//! The terminal backend lives in [`terminal`].

pub mod terminal;

use std::io;
use std::time::{Duration, Instant};

use crate::settings::Settings;

/// Everything the game needs to know about input for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Stop after this frame
    pub quit_requested: bool,
    /// At least one click (several clicks count once)
    pub clicked: bool,
    /// Latest output size in cells, if it changed
    pub resized: Option<(u16, u16)>,
}

impl FrameInput {
    /// Fold a later input of the same frame into this one
    pub fn merge(&mut self, other: FrameInput) {
        self.quit_requested |= other.quit_requested;
        self.clicked |= other.clicked;
        if other.resized.is_some() {
            self.resized = other.resized;
        }
    }
}

pub trait InputSource {
    /// Drain all pending events without blocking
    fn poll(&mut self) -> io::Result<FrameInput>;
}

pub trait Clock {
    /// Monotonic time since an arbitrary origin
    fn now(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Frame pacing: measures deltas between frame starts and sleeps out any
/// time left in the frame budget.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    target: Duration,
    max_delta: f32,
    frame_start: Option<Duration>,
}

impl FrameLimiter {
    pub fn new(target: Duration, max_delta: f32) -> Self {
        Self {
            target,
            max_delta,
            frame_start: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.frame_duration(), settings.max_frame_delta)
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    /// Mark the start of a frame. Returns seconds since the previous start
    /// (zero for the first frame), clamped to the maximum delta.
    pub fn begin(&mut self, clock: &impl Clock) -> f32 {
        let now = clock.now();
        let dt = match self.frame_start {
            Some(prev) => now.saturating_sub(prev).as_secs_f32(),
            None => 0.0,
        };
        self.frame_start = Some(now);
        if dt > self.max_delta {
            log::debug!("Frame took {:.3}s, clamping to {:.3}s", dt, self.max_delta);
        }
        dt.min(self.max_delta)
    }

    /// Sleep until the frame budget is used up
    pub fn end(&mut self, clock: &mut impl Clock) {
        let Some(start) = self.frame_start else {
            return;
        };
        let elapsed = clock.now().saturating_sub(start);
        if elapsed < self.target {
            clock.sleep(self.target - elapsed);
        }
    }
}
