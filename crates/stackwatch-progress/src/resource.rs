//! A single stack resource, tracked from a stream of stack events.

use std::io::Write;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::debug;

use stackwatch_core::constants::{MAX_CELL_LENGTH, NESTED_PADDING};
use stackwatch_core::signal::DoneSignal;
use stackwatch_core::status::{Classification, StatusEntry, StatusHistory};
use stackwatch_core::stopwatch::{Clock, StopWatch, SystemClock};
use stackwatch_core::stream::StackSubscriber;
use stackwatch_core::{ProgressError, StackEvent};

use crate::renderer::{DynamicRenderer, RenderOptions, Renderer};
use crate::style;
use crate::text::{render_lines, split_by_length, untab, SingleLine};

/// A status history together with the time spent in progress.
#[derive(Debug)]
pub(crate) struct TrackedStatus {
    history: StatusHistory,
    stopwatch: StopWatch,
}

impl TrackedStatus {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            history: StatusHistory::new(),
            stopwatch: StopWatch::with_clock(clock),
        }
    }

    /// Append `entry` and move the stopwatch accordingly.
    pub(crate) fn record(&mut self, entry: StatusEntry) {
        let was_in_progress = self.history.latest().value.in_progress();
        let classification = entry.value.classify();
        self.history.push(entry);

        match classification {
            Classification::InProgress if !was_in_progress => {
                self.stopwatch.reset();
                self.stopwatch.start();
            }
            c if c.is_terminal() => {
                // Resources that skip the in-progress phase report zero seconds.
                self.stopwatch.start();
                self.stopwatch.stop();
            }
            _ => {}
        }
    }

    pub(crate) fn history(&self) -> &StatusHistory {
        &self.history
    }

    /// `- description\t[status]\t[elapsed]`, then failure reasons in red.
    pub(crate) fn lines(&self, description: &str, padding: usize) -> Vec<SingleLine> {
        let (elapsed, started) = self.stopwatch.elapsed();
        let timer = if started { style::elapsed(elapsed) } else { String::new() };
        let mut lines = vec![SingleLine::new(
            format!(
                "- {}\t{}\t{timer}",
                untab(description),
                style::latest_status(&self.history)
            ),
            padding,
        )];
        for reason in self.history.failure_reasons() {
            for chunk in split_by_length(reason, MAX_CELL_LENGTH) {
                lines.push(SingleLine::new(style::error(&chunk), padding + NESTED_PADDING));
            }
        }
        lines
    }
}

/// A described status line updated from a background thread.
#[derive(Debug)]
pub(crate) struct StatusLine {
    description: String,
    padding: usize,
    state: Mutex<TrackedStatus>,
}

impl StatusLine {
    pub(crate) fn new(description: String, padding: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            description,
            padding,
            state: Mutex::new(TrackedStatus::new(clock)),
        }
    }

    pub(crate) fn record(&self, entry: StatusEntry) {
        self.state.lock().record(entry);
    }

    pub(crate) fn has_events(&self) -> bool {
        self.state.lock().history().has_events()
    }

    pub(crate) fn has_failure(&self) -> bool {
        self.state.lock().history().has_failure()
    }

    pub(crate) fn latest(&self) -> StatusEntry {
        self.state.lock().history().latest().clone()
    }
}

impl Renderer for StatusLine {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        let lines = self.state.lock().lines(&self.description, self.padding);
        render_lines(out, &lines)
    }
}

/// Renders the status of one stack resource.
#[derive(Debug, Clone)]
pub struct ResourceComponent {
    line: Arc<StatusLine>,
    done: DoneSignal,
}

impl ResourceComponent {
    /// Subscribe to `streamer` and track `logical_id`.
    pub fn listening(
        streamer: &dyn StackSubscriber,
        logical_id: impl Into<String>,
        description: impl Into<String>,
        opts: RenderOptions,
    ) -> Self {
        Self::listen(streamer.subscribe(), logical_id, description, opts)
    }

    /// Track the events in `events` whose logical id is `logical_id`.
    ///
    /// Events are consumed on a background thread until the channel closes.
    pub fn listen(
        events: Receiver<StackEvent>,
        logical_id: impl Into<String>,
        description: impl Into<String>,
        opts: RenderOptions,
    ) -> Self {
        Self::listen_with_clock(events, logical_id, description, opts, Arc::new(SystemClock))
    }

    pub fn listen_with_clock(
        events: Receiver<StackEvent>,
        logical_id: impl Into<String>,
        description: impl Into<String>,
        opts: RenderOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let logical_id = logical_id.into();
        let line = Arc::new(StatusLine::new(description.into(), opts.padding, clock));
        let done = DoneSignal::new();

        let state = Arc::clone(&line);
        let closer = done.clone();
        thread::spawn(move || {
            for event in events.iter().filter(|e| e.logical_id == logical_id) {
                state.record(event.entry());
            }
            debug!(logical_id = %logical_id, "resource stream closed");
            closer.close();
        });

        Self { line, done }
    }

    #[must_use]
    pub fn has_events(&self) -> bool {
        self.line.has_events()
    }

    /// Whether any status so far was a failure.
    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.line.has_failure()
    }

    #[must_use]
    pub fn latest(&self) -> StatusEntry {
        self.line.latest()
    }
}

impl Renderer for ResourceComponent {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        self.line.render(out)
    }
}

impl DynamicRenderer for ResourceComponent {
    fn done(&self) -> Receiver<()> {
        self.done.receiver()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console::strip_ansi_codes;
    use crossbeam_channel::unbounded;
    use stackwatch_core::signal::wait_closed;
    use stackwatch_core::status::StackStatus;
    use stackwatch_core::stopwatch::FakeClock;
    use std::time::Duration;

    fn entry(raw: &str, reason: &str) -> StatusEntry {
        StatusEntry::new(StackStatus::new(raw), reason)
    }

    fn tracked() -> (TrackedStatus, FakeClock) {
        let clock = FakeClock::new();
        (TrackedStatus::new(Arc::new(clock.clone())), clock)
    }

    fn text(lines: &[SingleLine]) -> String {
        let mut buf = Vec::new();
        render_lines(&mut buf, lines).unwrap();
        strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned()
    }

    #[test]
    fn not_started_has_no_timer() {
        let (status, _) = tracked();
        assert_eq!(text(&status.lines("ALB", 0)), "- ALB\t[not started]\t\n");
    }

    #[test]
    fn repeated_in_progress_keeps_timer() {
        let (mut status, clock) = tracked();
        status.record(entry("CREATE_IN_PROGRESS", ""));
        clock.advance(Duration::from_secs(2));
        status.record(entry("CREATE_IN_PROGRESS", "Resource creation Initiated"));
        clock.advance(Duration::from_secs(1));
        assert_eq!(
            text(&status.lines("ALB", 2)),
            "  - ALB\t[create in progress]\t[3.0s]\n"
        );
    }

    #[test]
    fn terminal_stops_timer() {
        let (mut status, clock) = tracked();
        status.record(entry("CREATE_IN_PROGRESS", ""));
        clock.advance(Duration::from_millis(1500));
        status.record(entry("CREATE_COMPLETE", ""));
        clock.advance(Duration::from_secs(10));
        assert_eq!(
            text(&status.lines("ALB", 0)),
            "- ALB\t[create complete]\t[1.5s]\n"
        );
    }

    #[test]
    fn terminal_without_progress_reports_zero() {
        let (mut status, clock) = tracked();
        status.record(entry("CREATE_COMPLETE", ""));
        clock.advance(Duration::from_secs(4));
        assert_eq!(
            text(&status.lines("Role", 0)),
            "- Role\t[create complete]\t[0.0s]\n"
        );
    }

    #[test]
    fn new_progress_phase_restarts_timer() {
        let (mut status, clock) = tracked();
        status.record(entry("CREATE_IN_PROGRESS", ""));
        clock.advance(Duration::from_secs(5));
        status.record(entry("CREATE_FAILED", "boom"));
        status.record(entry("DELETE_IN_PROGRESS", ""));
        clock.advance(Duration::from_secs(1));
        let rendered = text(&status.lines("Role", 0));
        assert!(rendered.starts_with("- Role\t[delete in progress]\t[1.0s]\n"), "{rendered}");
    }

    #[test]
    fn failure_reasons_are_wrapped_below() {
        let (mut status, _) = tracked();
        let reason = "x".repeat(MAX_CELL_LENGTH + 5);
        status.record(entry("CREATE_FAILED", &reason));
        let lines = status.lines("ALB", 2);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].padding, 4);
        assert_eq!(strip_ansi_codes(&lines[1].text), "x".repeat(MAX_CELL_LENGTH));
        assert_eq!(strip_ansi_codes(&lines[2].text), "xxxxx");
    }

    #[test]
    fn tabs_in_free_text_do_not_open_columns() {
        let (mut status, _) = tracked();
        status.record(entry("CREATE_FAILED", "bad\tvalue"));
        let rendered = text(&status.lines("My\tRole", 0));
        assert_eq!(rendered, "- My Role\t[create failed]\t[0.0s]\n  bad value\n");
        assert_eq!(crate::columns::align(&rendered).matches('\t').count(), 0);
    }

    #[test]
    fn component_filters_by_logical_id() {
        let (tx, rx) = unbounded();
        let component = ResourceComponent::listen(rx, "ALB", "Load balancer", RenderOptions::default());
        tx.send(StackEvent::new("Role", "CREATE_FAILED")).unwrap();
        tx.send(StackEvent::new("ALB", "CREATE_IN_PROGRESS")).unwrap();
        drop(tx);
        wait_closed(&component.done());

        assert!(!component.has_failure());
        assert!(component.latest().value.in_progress());

        let mut buf = Vec::new();
        assert_eq!(component.render(&mut buf).unwrap(), 1);
        let rendered = strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned();
        assert!(rendered.starts_with("- Load balancer\t[create in progress]\t["));
    }

    #[test]
    fn done_only_after_stream_closes() {
        let (tx, rx) = unbounded();
        let component = ResourceComponent::listen(rx, "ALB", "ALB", RenderOptions::default());
        tx.send(StackEvent::new("ALB", "CREATE_COMPLETE")).unwrap();
        assert!(component.done().recv_timeout(Duration::from_millis(20)).is_err());
        assert!(!matches!(
            component.done().try_recv(),
            Err(crossbeam_channel::TryRecvError::Disconnected)
        ));
        drop(tx);
        wait_closed(&component.done());
        assert!(component.has_events());
    }
}
