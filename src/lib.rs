//! Flappy - a tiny side-scrolling arcade game
//!
//! Core modules:
//! - `sim`: Simulation (entities, registry, collisions, round lifecycle)
//! - `assets`: Sprite catalog loaded once at startup
//! - `renderer`: Renderer capability, software framebuffer, terminal presenter
//! - `platform`: Input and clock capabilities
//! - `game_loop`: Fixed-order per-frame driver
//! - `settings`: Startup configuration

pub mod assets;
pub mod game_loop;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration defaults
pub mod consts {
    /// Logical window size in pixels (width, height)
    pub const WINDOW_SIZE: (u32, u32) = (200, 200);
    /// Largest accepted window side in pixels
    pub const MAX_WINDOW_SIDE: u32 = 4096;
    /// Preferred window placement (pixels / terminal cells)
    pub const WINDOW_POSITION: (u32, u32) = (200, 100);
    /// Frame rate cap
    pub const FPS: u32 = 60;

    /// Seconds between pipe pair spawns
    pub const PIPE_SPAWN_TIME: f32 = 2.0;
    /// Half the opening between a top and bottom pipe
    pub const PIPE_GAP: f32 = 20.0;
    /// Horizontal scroll speed of pipes and ground (pixels/s)
    pub const PIPE_SPEED: f32 = 50.0;
    /// Seconds a pipe lives before it is removed
    pub const PIPE_LIFETIME: f32 = 5.0;
    /// Gap centre is picked from [top margin, height - bottom margin]
    pub const PIPE_GAP_TOP_MARGIN: i32 = 30;
    pub const PIPE_GAP_BOTTOM_MARGIN: i32 = 40;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 300.0;
    /// Vertical velocity set on click (negative = up)
    pub const BIRD_IMPULSE: f32 = -100.0;
    /// Bird spawn x; spawn y is half the window height
    pub const BIRD_SPAWN_X: f32 = 20.0;
    /// Rate of the render-only angle smoothing (per second)
    pub const BIRD_TURN_RATE: f32 = 2.0;

    /// Seconds after a game over before a click restarts
    pub const GAME_OVER_COOLDOWN: f32 = 1.0;
    /// Longest frame delta fed to the simulation
    pub const MAX_FRAME_DELTA: f32 = 0.1;
}

/// Linear interpolation from `a` toward `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
