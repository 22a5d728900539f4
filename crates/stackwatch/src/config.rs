//! Application configuration from CLI flags and environment.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

/// Render live deployment progress from recorded event streams.
#[derive(Parser, Debug)]
#[command(name = "stackwatch", version, about, arg_required_else_help = true)]
pub struct AppConfig {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<Shell>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a recorded deployment and render its progress live.
    Replay(ReplayArgs),
    /// Print a single summary bar.
    Bar(BarArgs),
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON replay script.
    pub script: PathBuf,

    /// Redraw interval (e.g. "100ms"); defaults to the platform interval.
    #[arg(long, value_parser = parse_duration, env = "STACKWATCH_INTERVAL")]
    pub interval: Option<Duration>,

    /// Give up after this long (e.g. "10m", "1h").
    #[arg(long, default_value = "10m", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Multiplier applied to every delay of the script; 0 replays instantly.
    #[arg(long, default_value_t = 1.0, value_parser = parse_speed)]
    pub speed: f64,

    /// Disable colors.
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Args, Debug)]
pub struct BarArgs {
    /// Comma-separated magnitudes.
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub data: Vec<i64>,

    /// Width of the bar in characters.
    #[arg(long, allow_hyphen_values = true)]
    pub width: i64,

    /// Comma-separated representation of each magnitude.
    #[arg(long, value_delimiter = ',', required = true)]
    pub reps: Vec<String>,

    /// Representation used when every magnitude is zero.
    #[arg(long, default_value = " ")]
    pub empty: String,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Write the completion script for `shell` to `out`.
    pub fn write_completion(shell: Shell, out: &mut dyn io::Write) {
        let mut cmd = Self::command();
        clap_complete::generate(shell, &mut cmd, "stackwatch", out);
    }
}

/// Parse a duration string like "5m", "1h", "30s" or "250ms".
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let invalid = || format!("invalid duration {s:?}, expected e.g. 500ms, 30s, 5m or 1h");
    let (number, unit) = if let Some(ms) = s.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1_000)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, 60_000)
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours, 3_600_000)
    } else {
        (s, 1_000)
    };
    let n: u64 = number.parse().map_err(|_| invalid())?;
    n.checked_mul(unit).map(Duration::from_millis).ok_or_else(invalid)
}

fn parse_speed(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(speed) if speed.is_finite() && speed >= 0.0 => Ok(speed),
        _ => Err(format!("invalid speed {s:?}, expected a non-negative number")),
    }
}
