//! Terminal colors for progress output.
//!
//! Styling goes through `console`, which drops escape codes when stdout is
//! not a terminal. `NO_COLOR` disables styling everywhere.

use std::time::Duration;

use console::style;

use stackwatch_core::status::{StatusHistory, Tone};

/// Check if color output is disabled via `NO_COLOR` env var.
#[must_use]
pub fn is_color_disabled() -> bool {
    std::env::var("NO_COLOR").is_ok()
}

/// Apply `NO_COLOR` or an explicit override to every later styling call.
pub fn configure_colors(disable: bool) {
    if disable || is_color_disabled() {
        console::set_colors_enabled(false);
    }
}

#[must_use]
pub fn success(text: &str) -> String {
    style(text).green().to_string()
}

#[must_use]
pub fn error(text: &str) -> String {
    style(text).red().to_string()
}

#[must_use]
pub fn faint(text: &str) -> String {
    style(text).dim().to_string()
}

/// Color `text` according to a history's tone.
#[must_use]
pub fn tone(text: &str, tone: Tone) -> String {
    match tone {
        Tone::Success => success(text),
        Tone::Failure => error(text),
        Tone::Neutral => faint(text),
    }
}

/// The latest status of a history, bracketed and colored.
#[must_use]
pub fn latest_status(history: &StatusHistory) -> String {
    tone(&history.latest_label(), history.tone())
}

/// `[12.3s]`, faint.
#[must_use]
pub fn elapsed(duration: Duration) -> String {
    faint(&format!("[{:.1}s]", duration.as_secs_f64()))
}
