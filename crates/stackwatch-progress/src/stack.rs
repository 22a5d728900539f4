//! A whole stack: the stack itself plus every resource seen in its events.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info};

use stackwatch_core::signal::{wait_closed, DoneSignal};
use stackwatch_core::stopwatch::{Clock, SystemClock};
use stackwatch_core::stream::StackSubscriber;
use stackwatch_core::{ProgressError, StackEvent};

use crate::columns;
use crate::renderer::{DynamicRenderer, RenderOptions, Renderer};
use crate::resource::{ResourceComponent, TrackedStatus};
use crate::text::render_lines;

struct StackState {
    root: TrackedStatus,
    /// Append-only, in first-seen order.
    children: Vec<ResourceComponent>,
    seen: HashMap<String, usize>,
}

struct StackShared {
    description: String,
    padding: usize,
    state: Mutex<StackState>,
}

/// Renders a stack line followed by one line per resource of the stack.
///
/// Resources are discovered from the event stream: the first event for an
/// unknown logical id creates a nested [`ResourceComponent`] for it.
#[derive(Clone)]
pub struct StackComponent {
    shared: Arc<StackShared>,
    done: DoneSignal,
}

impl StackComponent {
    /// Subscribe to `streamer` and track the stack named `stack_name`.
    pub fn listening(
        streamer: &dyn StackSubscriber,
        stack_name: impl Into<String>,
        description: impl Into<String>,
        descriptions: HashMap<String, String>,
        opts: RenderOptions,
    ) -> Self {
        Self::listen(streamer.subscribe(), stack_name, description, descriptions, opts)
    }

    /// Track `stack_name` and its resources from `events`.
    ///
    /// `descriptions` maps logical ids to human readable descriptions;
    /// resources without one are shown as `LogicalId (Type)`.
    pub fn listen(
        events: Receiver<StackEvent>,
        stack_name: impl Into<String>,
        description: impl Into<String>,
        descriptions: HashMap<String, String>,
        opts: RenderOptions,
    ) -> Self {
        Self::listen_with_clock(
            events,
            stack_name,
            description,
            descriptions,
            opts,
            Arc::new(SystemClock),
        )
    }

    pub fn listen_with_clock(
        events: Receiver<StackEvent>,
        stack_name: impl Into<String>,
        description: impl Into<String>,
        descriptions: HashMap<String, String>,
        opts: RenderOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let stack_name = stack_name.into();
        let shared = Arc::new(StackShared {
            description: description.into(),
            padding: opts.padding,
            state: Mutex::new(StackState {
                root: TrackedStatus::new(Arc::clone(&clock)),
                children: Vec::new(),
                seen: HashMap::new(),
            }),
        });
        let done = DoneSignal::new();
        debug!(stack = %stack_name, "listening to stack events");

        let state = Arc::clone(&shared);
        let closer = done.clone();
        thread::spawn(move || {
            let mut senders: Vec<Sender<StackEvent>> = Vec::new();
            for event in &events {
                if event.logical_id == stack_name {
                    state.state.lock().root.record(event.entry());
                    continue;
                }
                let index = state.child_index(&event, &descriptions, opts.nested(), &clock, &mut senders);
                // Children only stop listening once their sender is dropped.
                let _ = senders[index].send(event);
            }

            drop(senders);
            let children: Vec<Receiver<()>> = state
                .state
                .lock()
                .children
                .iter()
                .map(DynamicRenderer::done)
                .collect();
            for child in &children {
                wait_closed(child);
            }
            debug!(stack = %stack_name, children = children.len(), "stack done");
            closer.close();
        });

        Self { shared, done }
    }

    /// Whether the stack or any of its resources reported an event.
    #[must_use]
    pub fn has_events(&self) -> bool {
        let state = self.shared.state.lock();
        state.root.history().has_events() || !state.children.is_empty()
    }

    /// Whether the stack or any of its resources ever failed.
    #[must_use]
    pub fn has_failure(&self) -> bool {
        let state = self.shared.state.lock();
        state.root.history().has_failure() || state.children.iter().any(ResourceComponent::has_failure)
    }

    #[must_use]
    pub fn children_count(&self) -> usize {
        self.shared.state.lock().children.len()
    }
}

impl StackShared {
    /// Index of the child tracking `event`, created on first sight.
    fn child_index(
        &self,
        event: &StackEvent,
        descriptions: &HashMap<String, String>,
        opts: RenderOptions,
        clock: &Arc<dyn Clock>,
        senders: &mut Vec<Sender<StackEvent>>,
    ) -> usize {
        let mut state = self.state.lock();
        if let Some(index) = state.seen.get(&event.logical_id) {
            return *index;
        }

        let description = descriptions.get(&event.logical_id).cloned().unwrap_or_else(|| {
            match &event.resource_type {
                Some(resource_type) => format!("{} ({resource_type})", event.logical_id),
                None => event.logical_id.clone(),
            }
        });
        let (tx, rx) = unbounded();
        let child = ResourceComponent::listen_with_clock(
            rx,
            event.logical_id.clone(),
            description,
            opts,
            Arc::clone(clock),
        );

        let index = state.children.len();
        state.children.push(child);
        state.seen.insert(event.logical_id.clone(), index);
        senders.push(tx);
        info!(logical_id = %event.logical_id, index, "discovered stack resource");
        index
    }
}

impl Renderer for StackComponent {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        let (root, children) = {
            let state = self.shared.state.lock();
            (
                state.root.lines(&self.shared.description, self.shared.padding),
                state.children.clone(),
            )
        };

        let mut buf = Vec::new();
        let mut total = render_lines(&mut buf, &root)?;
        for child in &children {
            total += child.render(&mut buf)?;
        }
        columns::write_aligned(out, &String::from_utf8_lossy(&buf))?;
        Ok(total)
    }
}

impl DynamicRenderer for StackComponent {
    fn done(&self) -> Receiver<()> {
        self.done.receiver()
    }
}
