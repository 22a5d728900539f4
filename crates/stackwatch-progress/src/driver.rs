//! The render loop: the only writer to the terminal.

use std::time::Duration;

use crossbeam_channel::{select, tick};
use tracing::{debug, info};

use stackwatch_core::signal::CancellationToken;
use stackwatch_core::ProgressError;

use crate::columns;
use crate::cursor::{erase_lines_above, HiddenCursor, TerminalSink};
use crate::renderer::{DynamicRenderer, Renderer};

/// How often the terminal is redrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderInterval(Duration);

impl RenderInterval {
    pub const DEFAULT: Duration = Duration::from_millis(100);
    /// Redrawing is slow and flickers on Windows consoles.
    pub const WINDOWS: Duration = Duration::from_millis(500);
    /// Headless runs keep every frame in their logs.
    pub const CI: Duration = Duration::from_secs(30);

    /// Resolve the interval for the current platform and environment.
    #[must_use]
    pub fn resolve() -> Self {
        let ci = std::env::var("CI").is_ok_and(|v| v == "true");
        Self::for_env(ci, cfg!(windows))
    }

    #[must_use]
    pub fn for_env(ci: bool, windows: bool) -> Self {
        if ci {
            Self(Self::CI)
        } else if windows {
            Self(Self::WINDOWS)
        } else {
            Self(Self::DEFAULT)
        }
    }

    #[must_use]
    pub fn duration(self) -> Duration {
        self.0
    }
}

impl From<Duration> for RenderInterval {
    fn from(interval: Duration) -> Self {
        Self(interval)
    }
}

/// Redraw `renderer` every `interval` until it is done or `cancel` fires.
///
/// Returns the number of lines of the final frame. The cursor is hidden
/// while rendering and shown again on every exit path.
pub fn render<W: TerminalSink + ?Sized>(
    cancel: &CancellationToken,
    out: &mut W,
    renderer: &dyn DynamicRenderer,
    interval: RenderInterval,
) -> Result<usize, ProgressError> {
    let mut out = HiddenCursor::new(out)?;
    let ticker = tick(interval.duration());
    let done = renderer.done();
    let cancelled = cancel.receiver();
    info!(interval = ?interval.duration(), "render driver started");

    let mut lines = 0;
    loop {
        cancel.check_cancelled()?;
        select! {
            recv(cancelled) -> _ => {
                info!("render driver cancelled");
                return Err(ProgressError::Cancelled);
            }
            recv(done) -> _ => {
                lines = erase_and_render(&mut out, renderer, lines)?;
                info!(lines, "render driver finished");
                return Ok(lines);
            }
            recv(ticker) -> _ => {
                lines = erase_and_render(&mut out, renderer, lines)?;
            }
        }
    }
}

/// Replace the previous frame of `prev_lines` lines with a fresh render.
///
/// The new frame is rendered before anything is erased, so a failing render
/// leaves the previous frame on screen.
pub fn erase_and_render<W: TerminalSink + ?Sized, R: Renderer + ?Sized>(
    out: &mut W,
    renderer: &R,
    prev_lines: usize,
) -> Result<usize, ProgressError> {
    let mut buf = Vec::new();
    let lines = renderer.render(&mut buf)?;

    erase_lines_above(out, prev_lines)?;
    out.flush()?;
    out.write_all(columns::align(&String::from_utf8_lossy(&buf)).as_bytes())?;
    out.flush()?;
    debug!(prev_lines, lines, "frame rendered");
    Ok(lines)
}
