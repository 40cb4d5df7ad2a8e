//! Terminal backend: keyboard/mouse input and raw-mode setup via `crossterm`

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute, terminal,
};

use super::{FrameInput, InputSource};

/// What a single terminal event means to the game
pub fn translate(event: &Event) -> FrameInput {
    let mut input = FrameInput::default();
    match event {
        Event::Key(key) => {
            if is_quit(key) {
                input.quit_requested = true;
            } else if is_click(key) {
                input.clicked = true;
            }
        }
        Event::Mouse(mouse) => {
            if matches!(mouse.kind, MouseEventKind::Down(_)) {
                input.clicked = true;
            }
        }
        Event::Resize(cols, rows) => input.resized = Some((*cols, *rows)),
        _ => {}
    }
    input
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn is_click(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && matches!(key.code, KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter)
}

/// Non-blocking reader of the terminal event queue
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn poll(&mut self) -> io::Result<FrameInput> {
        let mut input = FrameInput::default();
        while event::poll(Duration::ZERO)? {
            input.merge(translate(&event::read()?));
        }
        Ok(input)
    }
}

/// Raw mode, alternate screen and mouse capture for as long as it lives
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        // From here on, dropping the guard undoes whatever got set up
        let guard = Self { _private: () };
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            terminal::DisableLineWrap,
            cursor::Hide,
            EnableMouseCapture,
        )?;
        log::info!("Terminal entered raw mode");
        Ok(guard)
    }

    /// Current size in cells
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let restored = execute!(
            stdout(),
            DisableMouseCapture,
            cursor::Show,
            terminal::EnableLineWrap,
            terminal::LeaveAlternateScreen,
        )
        .and_then(|_| terminal::disable_raw_mode());
        match restored {
            Ok(()) => log::info!("Terminal restored"),
            Err(e) => log::error!("Failed to restore terminal: {}", e),
        }
    }
}
