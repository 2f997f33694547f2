use std::io::{Stdout, Write, stdout};
use std::time::Duration;

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};
use log::warn;

/// The drawing surface the game renders into.
pub trait Screen {
    fn clear(&mut self) -> crossterm::Result<()>;
    fn set_cell(&mut self, col: u16, row: u16, ch: char) -> crossterm::Result<()>;
    /// Flushes everything queued since the last call.
    fn show(&mut self) -> crossterm::Result<()>;
    fn bell(&mut self) -> crossterm::Result<()>;
}

/// Owns the real terminal while the game runs. Dropping it puts the terminal
/// back the way it was found, also when unwinding from a panic.
pub struct TermManager {
    stdout: Stdout,
}

impl TermManager {
    pub fn new() -> crossterm::Result<Self> {
        let mut term = TermManager { stdout: stdout() };
        term.setup()?;
        Ok(term)
    }

    /// Logs a warning if the terminal can't show a board of the given size.
    pub fn check_size(&self, cols: u16, rows: u16) -> crossterm::Result<()> {
        let (width, height) = terminal::size()?;
        if width < cols || height < rows {
            warn!("Terminal is {}x{}, the board needs {}x{}", width, height, cols, rows);
        }
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn setup(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    fn restore(&mut self) -> crossterm::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking)?;
        execute!(self.stdout, LeaveAlternateScreen)
    }
}

impl Screen for TermManager {
    fn clear(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))
    }

    fn set_cell(&mut self, col: u16, row: u16, ch: char) -> crossterm::Result<()> {
        queue!(self.stdout, cursor::MoveTo(col, row), style::Print(ch))
    }

    fn show(&mut self) -> crossterm::Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    fn bell(&mut self) -> crossterm::Result<()> {
        queue!(self.stdout, style::Print('\x07'))
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("Error restoring the terminal: {}", e);
        }
    }
}

/// Waits up to `timeout` for the next key press. Other terminal events are
/// skipped without extending the wait.
pub fn next_key(timeout: Duration) -> crossterm::Result<Option<KeyEvent>> {
    if !poll(timeout)? {
        return Ok(None);
    }

    match read()? {
        Event::Key(ev) => Ok(Some(ev)),
        _ => Ok(None),
    }
}
