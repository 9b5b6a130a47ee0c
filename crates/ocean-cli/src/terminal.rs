//! Raw terminal input for console sessions.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::CliError;

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerminalSize {
    /// Columns.
    pub width: u16,
    /// Rows.
    pub height: u16,
}

/// Interactive terminal used by `apps console`.
pub trait Terminal {
    /// Switch to raw mode and forward keystrokes to `tx`. Raw mode ends when
    /// the returned guard drops.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled.
    fn read_raw_stdin(&self, tx: mpsc::Sender<String>) -> Result<RawModeGuard, CliError>;

    /// Forward the current size and every later resize to `tx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be read.
    fn monitor_resize_events(&self, tx: mpsc::Sender<TerminalSize>) -> Result<(), CliError>;
}

/// Restores cooked mode on drop.
#[derive(Debug)]
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    /// A guard that does nothing.
    #[must_use]
    pub const fn noop() -> Self {
        Self { active: false }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = terminal::disable_raw_mode() {
                warn!(error = %e, "failed to restore terminal mode");
            }
        }
    }
}

type ResizeSender = Arc<Mutex<Option<mpsc::Sender<TerminalSize>>>>;

/// Terminal backed by crossterm. One reader thread serves both keystrokes
/// and resize events.
#[derive(Debug, Default, Clone)]
pub struct CrosstermTerminal {
    resize: ResizeSender,
}

impl Terminal for CrosstermTerminal {
    fn read_raw_stdin(&self, tx: mpsc::Sender<String>) -> Result<RawModeGuard, CliError> {
        terminal::enable_raw_mode()?;
        let guard = RawModeGuard { active: true };
        let resize = Arc::clone(&self.resize);
        thread::spawn(move || read_events(&tx, &resize));
        Ok(guard)
    }

    fn monitor_resize_events(&self, tx: mpsc::Sender<TerminalSize>) -> Result<(), CliError> {
        let (width, height) = terminal::size()?;
        if tx.try_send(TerminalSize { width, height }).is_err() {
            debug!("resize receiver gone");
        }
        if let Ok(mut slot) = self.resize.lock() {
            *slot = Some(tx);
        }
        Ok(())
    }
}

fn read_events(tx: &mpsc::Sender<String>, resize: &ResizeSender) {
    while !tx.is_closed() {
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                debug!(error = %e, "terminal poll failed");
                break;
            }
        }
        let forwarded = match event::read() {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => encode_key(&key),
            Ok(Event::Paste(text)) => Some(text),
            Ok(Event::Resize(width, height)) => {
                if let Ok(slot) = resize.lock() {
                    if let Some(sender) = slot.as_ref() {
                        // a dropped resize is superseded by the next one
                        let _ = sender.try_send(TerminalSize { width, height });
                    }
                }
                None
            }
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "terminal read failed");
                break;
            }
        };
        if let Some(data) = forwarded {
            if tx.blocking_send(data).is_err() {
                break;
            }
        }
    }
}

/// Encode a key press as the bytes a terminal would send.
pub fn encode_key(key: &KeyEvent) -> Option<String> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let encoded = match key.code {
        KeyCode::Char(c) if ctrl => control_char(c)?.to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "\r".into(),
        KeyCode::Backspace => "\x7f".into(),
        KeyCode::Tab => "\t".into(),
        KeyCode::BackTab => "\x1b[Z".into(),
        KeyCode::Esc => "\x1b".into(),
        KeyCode::Up => "\x1b[A".into(),
        KeyCode::Down => "\x1b[B".into(),
        KeyCode::Right => "\x1b[C".into(),
        KeyCode::Left => "\x1b[D".into(),
        KeyCode::Home => "\x1b[H".into(),
        KeyCode::End => "\x1b[F".into(),
        KeyCode::PageUp => "\x1b[5~".into(),
        KeyCode::PageDown => "\x1b[6~".into(),
        KeyCode::Insert => "\x1b[2~".into(),
        KeyCode::Delete => "\x1b[3~".into(),
        _ => return None,
    };
    Some(if alt { format!("\x1b{encoded}") } else { encoded })
}

fn control_char(c: char) -> Option<char> {
    match c.to_ascii_lowercase() {
        l @ 'a'..='z' => char::from_u32(u32::from(l) - u32::from('a') + 1),
        '@' | ' ' => Some('\0'),
        '[' => Some('\x1b'),
        '\\' => Some('\x1c'),
        ']' => Some('\x1d'),
        '^' => Some('\x1e'),
        '_' => Some('\x1f'),
        _ => None,
    }
}
