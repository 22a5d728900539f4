//! Shared helpers for the cross-crate scenario tests.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use stackwatch_progress::TerminalSink;

/// A terminal that records every byte written to it.
///
/// Clones share the same recording, so a test can keep one handle while the
/// render driver writes through another.
#[derive(Debug, Clone, Default)]
pub struct RecordingTerminal {
    bytes: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<Mutex<usize>>,
}

impl RecordingTerminal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    #[must_use]
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    #[must_use]
    pub fn flushes(&self) -> usize {
        *self.flushes.lock()
    }

    /// Number of occurrences of `sequence` in the output.
    #[must_use]
    pub fn count(&self, sequence: &str) -> usize {
        self.output().matches(sequence).count()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for RecordingTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        *self.flushes.lock() += 1;
        Ok(())
    }
}

impl TerminalSink for RecordingTerminal {
    fn is_terminal(&self) -> bool {
        true
    }
}

/// Escape sequences emitted by the cursor helpers.
pub mod escapes {
    pub const MOVE_UP: &str = "\x1b[1A";
    pub const CLEAR_LINE: &str = "\x1b[2K";
    pub const HIDE_CURSOR: &str = "\x1b[?25l";
    pub const SHOW_CURSOR: &str = "\x1b[?25h";
}
