//! Rolling update of a service: deployments, stopped tasks, failure events
//! and alarms, refreshed from periodic snapshots.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::debug;

use stackwatch_core::constants::{
    DEFAULT_MAX_FAILURE_MESSAGES, DEFAULT_MAX_STOPPED_TASKS, MAX_CELL_LENGTH, NESTED_PADDING,
    SHORT_TASK_ID_LENGTH,
};
use stackwatch_core::signal::DoneSignal;
use stackwatch_core::status::humanize;
use stackwatch_core::stream::ServiceSubscriber;
use stackwatch_core::{AlarmStatus, Deployment, ProgressError, ServiceSnapshot, StoppedTask};

use crate::renderer::{DynamicRenderer, RenderOptions, Renderer};
use crate::style;
use crate::table::Table;
use crate::text::{render_lines, split_by_length, SingleLine};

/// Options for a [`RollingUpdateComponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingUpdateOptions {
    pub padding: usize,
    /// Number of failure messages kept, oldest evicted first.
    pub max_failure_messages: usize,
    /// Number of most recently stopped tasks kept.
    pub max_stopped_tasks: usize,
}

impl Default for RollingUpdateOptions {
    fn default() -> Self {
        Self {
            padding: 0,
            max_failure_messages: DEFAULT_MAX_FAILURE_MESSAGES,
            max_stopped_tasks: DEFAULT_MAX_STOPPED_TASKS,
        }
    }
}

impl From<RenderOptions> for RollingUpdateOptions {
    fn from(opts: RenderOptions) -> Self {
        Self {
            padding: opts.padding,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
struct RollingState {
    deployments: Vec<Deployment>,
    failure_messages: VecDeque<String>,
    alarms: Vec<AlarmStatus>,
    stopped_tasks: Vec<StoppedTask>,
}

impl RollingState {
    fn apply(&mut self, snapshot: ServiceSnapshot, opts: &RollingUpdateOptions) {
        self.deployments = snapshot.deployments;
        self.alarms = snapshot.alarms;

        for message in snapshot.failure_events {
            self.failure_messages.push_back(message);
            while self.failure_messages.len() > opts.max_failure_messages {
                self.failure_messages.pop_front();
            }
        }

        let mut stopped = snapshot.stopped_tasks;
        stopped.sort_by(|a, b| b.stopping_at.cmp(&a.stopping_at));
        stopped.truncate(opts.max_stopped_tasks);
        self.stopped_tasks = stopped;
    }
}

/// Renders the progress of a rolling update.
#[derive(Clone)]
pub struct RollingUpdateComponent {
    state: Arc<Mutex<RollingState>>,
    opts: RollingUpdateOptions,
    done: DoneSignal,
}

impl RollingUpdateComponent {
    pub fn listening(streamer: &dyn ServiceSubscriber, opts: RollingUpdateOptions) -> Self {
        Self::listen(streamer.subscribe(), opts)
    }

    /// Apply every snapshot of `snapshots` until the channel closes.
    pub fn listen(snapshots: Receiver<ServiceSnapshot>, opts: RollingUpdateOptions) -> Self {
        let state = Arc::new(Mutex::new(RollingState::default()));
        let done = DoneSignal::new();

        let shared = Arc::clone(&state);
        let closer = done.clone();
        thread::spawn(move || {
            for snapshot in &snapshots {
                shared.lock().apply(snapshot, &opts);
            }
            debug!("service stream closed");
            closer.close();
        });

        Self { state, opts, done }
    }

    /// Retained failure messages, oldest first.
    #[must_use]
    pub fn failure_messages(&self) -> Vec<String> {
        self.state.lock().failure_messages.iter().cloned().collect()
    }

    #[must_use]
    pub fn deployments(&self) -> Vec<Deployment> {
        self.state.lock().deployments.clone()
    }

    #[must_use]
    pub fn stopped_tasks(&self) -> Vec<StoppedTask> {
        self.state.lock().stopped_tasks.clone()
    }

    fn deployments_table(&self, deployments: &[Deployment]) -> Table {
        let rows = deployments
            .iter()
            .map(|d| {
                vec![
                    humanize(&d.status),
                    revision(&d.task_def_revision).to_string(),
                    rollout_state(&d.rollout_state),
                    d.desired.to_string(),
                    d.running.to_string(),
                    d.failed.to_string(),
                    d.pending.to_string(),
                ]
            })
            .collect();
        Table::new(
            style::faint("Deployments"),
            &["", "Revision", "Rollout", "Desired", "Running", "Failed", "Pending"],
            rows,
        )
        .with_padding(self.opts.padding)
    }

    fn stopped_task_lines(&self, tasks: &[StoppedTask]) -> Vec<SingleLine> {
        if tasks.is_empty() {
            return Vec::new();
        }

        // Tasks are sorted newest first, so groups keep that order too.
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for task in tasks {
            let id = short_task_id(&task.id);
            match groups.iter_mut().find(|(reason, _)| *reason == task.stop_reason.as_str()) {
                Some((_, ids)) => ids.push(id),
                None => groups.push((task.stop_reason.as_str(), vec![id])),
            }
        }

        let padding = self.opts.padding;
        let noun = if tasks.len() == 1 { "task" } else { "tasks" };
        let mut lines = vec![
            SingleLine::blank(),
            SingleLine::new(style::faint(&format!("Latest {} stopped {noun}", tasks.len())), padding),
        ];
        for (reason, ids) in groups {
            lines.push(SingleLine::new(format!("- {}", ids.join(", ")), padding + NESTED_PADDING));
            for chunk in split_by_length(reason, MAX_CELL_LENGTH) {
                lines.push(SingleLine::new(style::error(&chunk), padding + 2 * NESTED_PADDING));
            }
        }
        lines
    }

    fn failure_message_lines(&self, messages: &VecDeque<String>) -> Vec<SingleLine> {
        if messages.is_empty() {
            return Vec::new();
        }

        let padding = self.opts.padding;
        let mut lines = vec![
            SingleLine::blank(),
            SingleLine::new(style::faint("Latest failure event(s)"), padding),
        ];
        for message in messages.iter().rev() {
            for (i, chunk) in split_by_length(message, MAX_CELL_LENGTH).iter().enumerate() {
                let bullet = if i == 0 { "- " } else { "  " };
                lines.push(SingleLine::new(
                    format!("{bullet}{}", style::error(chunk)),
                    padding + NESTED_PADDING,
                ));
            }
        }
        lines
    }

    fn alarms_table(&self, alarms: &[AlarmStatus]) -> Table {
        let rows = alarms
            .iter()
            .map(|a| vec![a.name.clone(), alarm_state(&a.state)])
            .collect();
        Table::new(style::faint("Alarms"), &["Name", "State"], rows).with_padding(self.opts.padding)
    }
}

impl Renderer for RollingUpdateComponent {
    fn render(&self, out: &mut dyn Write) -> Result<usize, ProgressError> {
        let state = self.state.lock().clone();

        let mut buf = Vec::new();
        let mut total = self.deployments_table(&state.deployments).render(&mut buf)?;
        total += render_lines(&mut buf, &self.stopped_task_lines(&state.stopped_tasks))?;
        total += render_lines(&mut buf, &self.failure_message_lines(&state.failure_messages))?;
        if !state.alarms.is_empty() {
            total += SingleLine::blank().render(&mut buf)?;
            total += self.alarms_table(&state.alarms).render(&mut buf)?;
        }

        out.write_all(&buf)?;
        Ok(total)
    }
}

impl DynamicRenderer for RollingUpdateComponent {
    fn done(&self) -> Receiver<()> {
        self.done.receiver()
    }
}

/// The revision number of a task definition ARN, or the input itself.
fn revision(task_def: &str) -> &str {
    task_def.rsplit(':').next().unwrap_or(task_def)
}

fn short_task_id(id: &str) -> &str {
    let id = id.rsplit('/').next().unwrap_or(id);
    match id.char_indices().nth(SHORT_TASK_ID_LENGTH) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn rollout_state(state: &str) -> String {
    let text = humanize(state);
    match state {
        "COMPLETED" => style::success(&text),
        "FAILED" => style::error(&text),
        _ => style::faint(&text),
    }
}

fn alarm_state(state: &str) -> String {
    let text = format!("[{}]", humanize(state));
    match state {
        "OK" => style::success(&text),
        "ALARM" => style::error(&text),
        _ => style::faint(&text),
    }
}
