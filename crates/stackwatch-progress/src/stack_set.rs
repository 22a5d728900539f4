//! A stack-set operation, tracked from a stream of operation events.

use std::io::Write;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;
use tracing::debug;

use stackwatch_core::signal::DoneSignal;
use stackwatch_core::status::StatusEntry;
use stackwatch_core::stopwatch::{Clock, SystemClock};
use stackwatch_core::stream::StackSetSubscriber;
use stackwatch_core::{ProgressError, StackSetOpEvent};

use crate::renderer::{DynamicRenderer, RenderOptions, Renderer};
use crate::resource::StatusLine;

/// Renders the status of a stack-set operation as a single resource line.
#[derive(Debug, Clone)]
pub struct StackSetComponent {
    line: Arc<StatusLine>,
    done: DoneSignal,
}

impl StackSetComponent {
    pub fn listening(
        streamer: &dyn StackSetSubscriber,
        operation_id: Option<String>,
        description: impl Into<String>,
        opts: RenderOptions,
    ) -> Self {
        Self::listen(streamer.subscribe(), operation_id, description, opts)
    }

    /// Track operation events, only those of `operation_id` when given.
    pub fn listen(
        events: Receiver<StackSetOpEvent>,
        operation_id: Option<String>,
        description: impl Into<String>,
        opts: RenderOptions,
    ) -> Self {
        Self::listen_with_clock(events, operation_id, description, opts, Arc::new(SystemClock))
    }

    pub fn listen_with_clock(
        events: Receiver<StackSetOpEvent>,
        operation_id: Option<String>,
        description: impl Into<String>,
        opts: RenderOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let line = Arc::new(StatusLine::new(description.into(), opts.padding, clock));
        let done = DoneSignal::new();

        let state = Arc::clone(&line);
        let closer = done.clone();
        thread::spawn(move || {
            let wanted = |e: &StackSetOpEvent| operation_id.as_ref().map_or(true, |id| *id == e.operation_id);
            for event in events.iter().filter(wanted) {
                state.record(event.entry());
            }
            debug!(operation_id = ?operation_id, "stack set stream closed");
            closer.close();
        });

        Self { line, done }
    }

    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.line.has_failure()
    }

    #[must_use]
    pub fn latest(&self) -> StatusEntry {
        self.line.latest()
    }
}

impl Renderer for StackSetComponent {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        self.line.render(out)
    }
}

impl DynamicRenderer for StackSetComponent {
    fn done(&self) -> Receiver<()> {
        self.done.receiver()
    }
}
