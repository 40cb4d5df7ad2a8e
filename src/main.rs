//! Flappy entry point
//!
//! Loads settings and sprites, takes over the terminal and runs the game loop.
//! Logs go to `flappy.log` since the terminal is busy showing the game.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use flappy::Settings;
use flappy::assets::{SpriteCatalog, SpriteKey};
use flappy::game_loop::GameLoop;
use flappy::platform::SystemClock;
use flappy::platform::terminal::{TerminalGuard, TerminalInput};
use flappy::renderer::{Framebuffer, TerminalRenderer};
use flappy::sim::GameSession;

const LOG_FILE: &str = "flappy.log";

fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match File::create(LOG_FILE) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!("Could not create {}: {}, logging to stderr", LOG_FILE, e),
    }
    builder.init();
}

/// `dir` as given if it exists, else next to the executable
fn resolve_resource_dir(dir: &Path) -> PathBuf {
    if dir.is_absolute() || dir.exists() {
        return dir.to_path_buf();
    }
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|parent| parent.join(dir)));
    match beside_exe {
        Some(path) if path.exists() => path,
        _ => dir.to_path_buf(),
    }
}

fn run() -> io::Result<u64> {
    let settings_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(Settings::DEFAULT_FILE));
    let settings = Settings::load(&settings_path);

    let resource_dir = resolve_resource_dir(&settings.resource_dir);
    let catalog = Rc::new(SpriteCatalog::load_dir(&resource_dir));
    if let Some(pipe) = catalog.handle(SpriteKey::PipeTop) {
        if !settings.pipe_lifetime_is_safe(pipe.size.x) {
            log::warn!(
                "pipe_lifetime {}s is shorter than the {:.2}s a pipe needs to leave the screen",
                settings.pipe_lifetime,
                settings.pipe_exit_time(pipe.size.x)
            );
        }
    }

    let session = GameSession::new(settings.clone(), &catalog);

    let guard = TerminalGuard::enter()?;
    let frame = Framebuffer::new(
        settings.window_size.0,
        settings.window_size.1,
        Rc::clone(&catalog),
    );
    let renderer = TerminalRenderer::new(
        frame,
        BufWriter::new(io::stdout()),
        guard.size()?,
        settings.window_position,
    );
    let mut game = GameLoop::new(session, TerminalInput, SystemClock::new(), renderer);
    let frames = game.run()?;

    // Flush the last frame before leaving the alternate screen
    drop(game);
    drop(guard);
    Ok(frames)
}

fn main() -> ExitCode {
    init_logging();
    log::info!("Flappy {} starting...", env!("CARGO_PKG_VERSION"));

    match run() {
        Ok(frames) => {
            log::info!("Exited normally after {} frames", frames);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Fatal platform error: {}", e);
            eprintln!("flappy: {}", e);
            ExitCode::FAILURE
        }
    }
}
