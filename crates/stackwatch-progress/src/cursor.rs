//! Cursor control on the output sink.
//!
//! Escape sequences are only emitted when the sink is a terminal; piping the
//! output to a file still produces every rendered line.

use std::io::{self, IsTerminal, Write};

use crossterm::cursor::{Hide, MoveUp, Show};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;

use stackwatch_core::ProgressError;

/// An output sink that knows whether it is attached to a terminal.
pub trait TerminalSink: Write + Send {
    fn is_terminal(&self) -> bool;
}

impl TerminalSink for console::Term {
    fn is_terminal(&self) -> bool {
        self.is_term()
    }
}

impl TerminalSink for io::Stdout {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl TerminalSink for io::Stderr {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl TerminalSink for Vec<u8> {
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Erase the `n` lines above the cursor, leaving it at the start of the
/// topmost erased line.
pub fn erase_lines_above<W: TerminalSink + ?Sized>(out: &mut W, n: usize) -> Result<(), ProgressError> {
    if !out.is_terminal() {
        return Ok(());
    }
    for _ in 0..n {
        out.queue(MoveUp(1))?;
        out.queue(Clear(ClearType::CurrentLine))?;
    }
    out.queue(Clear(ClearType::CurrentLine))?;
    Ok(())
}

/// Hides the cursor for as long as it lives.
pub struct HiddenCursor<'a, W: TerminalSink + ?Sized> {
    out: &'a mut W,
}

impl<'a, W: TerminalSink + ?Sized> HiddenCursor<'a, W> {
    pub fn new(out: &'a mut W) -> Result<Self, ProgressError> {
        if out.is_terminal() {
            out.queue(Hide)?;
            out.flush()?;
        }
        Ok(Self { out })
    }
}

impl<W: TerminalSink + ?Sized> Drop for HiddenCursor<'_, W> {
    fn drop(&mut self) {
        if self.out.is_terminal() {
            // Nothing left to report a failure to.
            let _ = self.out.queue(Show).and_then(|out| out.flush());
        }
    }
}

impl<W: TerminalSink + ?Sized> Write for HiddenCursor<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: TerminalSink + ?Sized> TerminalSink for HiddenCursor<'_, W> {
    fn is_terminal(&self) -> bool {
        self.out.is_terminal()
    }
}
