//! Game settings
//!
//! Read once at startup from an optional JSON file and never mutated while the
//! game runs. Every field has a default, so a partial file is fine.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Startup configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Window ===
    /// Logical playfield size in pixels (width, height)
    pub window_size: (u32, u32),
    /// Preferred placement of the playfield
    pub window_position: (u32, u32),
    /// Frame rate cap
    pub fps: u32,

    // === Pipes ===
    /// Seconds between pipe pair spawns
    pub pipe_spawn_time: f32,
    /// Distance from the gap centre to each pipe's inner edge
    pub pipe_gap: f32,
    /// Scroll speed of pipes and ground (pixels/s)
    pub pipe_speed: f32,
    /// Seconds before a pipe is removed
    pub pipe_lifetime: f32,
    /// Gap centre margins (top, bottom) measured from the window edges
    pub pipe_gap_margins: (i32, i32),

    // === Bird ===
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Vertical velocity set by a click
    pub bird_impulse: f32,

    // === Round ===
    /// Seconds after a game over before a click restarts
    pub game_over_cooldown: f32,
    /// Frame deltas above this are clamped (stalls, suspended terminal)
    pub max_frame_delta: f32,

    // === Debug / assets ===
    /// Stroke every entity's bounding box
    pub debug_bounds: bool,
    /// Directory holding `sprites/`
    pub resource_dir: PathBuf,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_size: WINDOW_SIZE,
            window_position: WINDOW_POSITION,
            fps: FPS,

            pipe_spawn_time: PIPE_SPAWN_TIME,
            pipe_gap: PIPE_GAP,
            pipe_speed: PIPE_SPEED,
            pipe_lifetime: PIPE_LIFETIME,
            pipe_gap_margins: (PIPE_GAP_TOP_MARGIN, PIPE_GAP_BOTTOM_MARGIN),

            gravity: GRAVITY,
            bird_impulse: BIRD_IMPULSE,

            game_over_cooldown: GAME_OVER_COOLDOWN,
            max_frame_delta: MAX_FRAME_DELTA,

            debug_bounds: false,
            resource_dir: PathBuf::from("resources"),
            seed: None,
        }
    }
}

impl Settings {
    /// Default settings file looked up in the working directory
    pub const DEFAULT_FILE: &'static str = "flappy.json";

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from `path`, falling back to defaults.
    ///
    /// A missing file is not an error. An unreadable or malformed file is
    /// logged and ignored.
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings file at '{}', using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("Could not read '{}': {}, using defaults", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from '{}'", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Malformed settings in '{}': {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp values the game cannot run with
    pub fn sanitized(mut self) -> Self {
        if self.fps == 0 {
            log::warn!("fps must be at least 1, using {}", FPS);
            self.fps = FPS;
        }
        if self.window_size.0 == 0 || self.window_size.1 == 0 {
            log::warn!("window_size must be positive, using {:?}", WINDOW_SIZE);
            self.window_size = WINDOW_SIZE;
        }
        if self.window_size.0 > MAX_WINDOW_SIDE || self.window_size.1 > MAX_WINDOW_SIDE {
            log::warn!(
                "window_size {:?} exceeds {}px, clamping",
                self.window_size,
                MAX_WINDOW_SIDE
            );
            self.window_size = (
                self.window_size.0.min(MAX_WINDOW_SIDE),
                self.window_size.1.min(MAX_WINDOW_SIDE),
            );
        }
        if !(self.pipe_spawn_time > 0.0) {
            log::warn!("pipe_spawn_time must be positive, using {}", PIPE_SPAWN_TIME);
            self.pipe_spawn_time = PIPE_SPAWN_TIME;
        }
        if !(self.max_frame_delta > 0.0) {
            log::warn!("max_frame_delta must be positive, using {}", MAX_FRAME_DELTA);
            self.max_frame_delta = MAX_FRAME_DELTA;
        }
        let (top, bottom) = self.pipe_gap_margins;
        if top + bottom > self.window_size.1 as i32 {
            log::warn!(
                "pipe_gap_margins {:?} leave no room in a {}px window, using defaults",
                self.pipe_gap_margins,
                self.window_size.1
            );
            self.pipe_gap_margins = (PIPE_GAP_TOP_MARGIN, PIPE_GAP_BOTTOM_MARGIN);
        }
        self
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.window_size.0 as f32
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.window_size.1 as f32
    }

    /// Target duration of one frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Inclusive range the pipe gap centre is drawn from
    pub fn gap_center_range(&self) -> RangeInclusive<i32> {
        let (top, bottom) = self.pipe_gap_margins;
        let lo = top;
        let hi = (self.window_size.1 as i32 - bottom).max(lo);
        lo..=hi
    }

    /// Where a fresh bird appears
    pub fn bird_spawn(&self) -> Vec2 {
        Vec2::new(BIRD_SPAWN_X, self.height() / 2.0)
    }

    /// Seconds a pipe of `pipe_width` needs to scroll from its spawn point
    /// fully past the left edge
    pub fn pipe_exit_time(&self, pipe_width: f32) -> f32 {
        if self.pipe_speed <= 0.0 {
            return f32::INFINITY;
        }
        (self.width() + pipe_width) / self.pipe_speed
    }

    /// True if time-based pipe expiry only ever removes off-screen pipes
    pub fn pipe_lifetime_is_safe(&self, pipe_width: f32) -> bool {
        self.pipe_lifetime >= self.pipe_exit_time(pipe_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "gravity": 500.0, "debug_bounds": true }"#).unwrap();
        assert_eq!(settings.gravity, 500.0);
        assert!(settings.debug_bounds);
        assert_eq!(settings.pipe_speed, PIPE_SPEED);
        assert_eq!(settings.window_size, WINDOW_SIZE);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ gravity: ").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load(Path::new("definitely/not/here/flappy.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_gap_center_range_default() {
        let settings = Settings::default();
        assert_eq!(settings.gap_center_range(), 30..=160);
    }

    #[test]
    fn test_sanitized_fixes_zero_fps_and_margins() {
        let settings = Settings {
            fps: 0,
            pipe_gap_margins: (150, 150),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.fps, FPS);
        assert_eq!(settings.pipe_gap_margins, (PIPE_GAP_TOP_MARGIN, PIPE_GAP_BOTTOM_MARGIN));
    }

    #[test]
    fn test_sanitized_caps_window_size() {
        let settings = Settings {
            window_size: (70_000, 70_000),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.window_size, (MAX_WINDOW_SIDE, MAX_WINDOW_SIDE));

        let tall = Settings::from_json(r#"{ "window_size": [320, 100000] }"#)
            .unwrap()
            .sanitized();
        assert_eq!(tall.window_size, (320, MAX_WINDOW_SIDE));
        assert!(tall.gap_center_range().end() < &(MAX_WINDOW_SIDE as i32));
    }

    #[test]
    fn test_default_pipe_lifetime_clears_screen() {
        // 200px window + 26px pipe at 50px/s = 4.52s < 5.0s lifetime
        let settings = Settings::default();
        assert!((settings.pipe_exit_time(26.0) - 4.52).abs() < 1e-4);
        assert!(settings.pipe_lifetime_is_safe(26.0));

        let fast_expiry = Settings {
            pipe_lifetime: 3.0,
            ..Default::default()
        };
        assert!(!fast_expiry.pipe_lifetime_is_safe(26.0));
    }

    #[test]
    fn test_bird_spawn_is_mid_height() {
        let settings = Settings::default();
        assert_eq!(settings.bird_spawn(), Vec2::new(20.0, 100.0));
    }
}
