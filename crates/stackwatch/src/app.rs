//! Application entry point and dispatch.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{after, select, RecvTimeoutError};
use tracing::{debug, info, warn};

use stackwatch_core::constants::exit_codes;
use stackwatch_core::{
    CancellationToken, DoneSignal, Fanout, ProgressError, ServiceSnapshot, StackEvent, StackSetOpEvent,
};
use stackwatch_progress::{
    render, style, DynamicRenderer, MultiRenderer, RenderInterval, RenderOptions, Renderer,
    RollingUpdateComponent, RollingUpdateOptions, StackComponent, StackSetComponent, SummaryBar, TerminalSink,
};

use crate::config::{AppConfig, BarArgs, Command, ReplayArgs};
use crate::script::{Payload, Script, ScriptEvent};

/// How a run that did not error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Rendering finished, but some resource of the stack failed.
    DeploymentFailed,
}

impl Outcome {
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Completed => exit_codes::SUCCESS,
            Self::DeploymentFailed => exit_codes::ERROR_DEPLOYMENT_FAILED,
        }
    }
}

/// Run the application.
pub fn run(config: &AppConfig) -> Result<Outcome> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        AppConfig::write_completion(shell, &mut io::stdout());
        return Ok(Outcome::Completed);
    }

    match &config.command {
        Some(Command::Replay(args)) => {
            style::configure_colors(args.no_color);
            let cancel = CancellationToken::new();
            ctrlc_handler(cancel.clone())?;
            let mut term = console::Term::stdout();
            replay(args, &mut term, &cancel)
        }
        Some(Command::Bar(args)) => bar(args, &mut io::stdout().lock()),
        None => Ok(Outcome::Completed),
    }
}

/// Print one summary bar.
pub fn bar(args: &BarArgs, out: &mut dyn io::Write) -> Result<Outcome> {
    SummaryBar::new(args.data.clone(), args.width, args.reps.clone(), args.empty.clone()).render(out)?;
    Ok(Outcome::Completed)
}

/// In-memory streams the replayed events are published to.
#[derive(Default)]
struct Streams {
    stack: Fanout<StackEvent>,
    service: Fanout<ServiceSnapshot>,
    stack_set: Fanout<StackSetOpEvent>,
}

impl Streams {
    fn publish(&self, payload: &Payload) {
        match payload {
            Payload::Stack(event) => self.stack.publish(event),
            Payload::Service(snapshot) => self.service.publish(snapshot),
            Payload::StackSet(event) => self.stack_set.publish(event),
        }
    }

    fn close(&self) {
        self.stack.close();
        self.service.close();
        self.stack_set.close();
    }
}

/// Replay the script of `args` and render it to `out` until every
/// component is done, `cancel` fires, or the timeout elapses.
pub fn replay<W: TerminalSink + ?Sized>(
    args: &ReplayArgs,
    out: &mut W,
    cancel: &CancellationToken,
) -> Result<Outcome> {
    let script = Script::load(&args.script)?;
    let interval = args.interval.map_or_else(RenderInterval::resolve, RenderInterval::from);
    let streams = Arc::new(Streams::default());

    let mut children: Vec<Arc<dyn DynamicRenderer>> = Vec::new();
    let stack = script.stack.as_ref().map(|section| {
        Arc::new(StackComponent::listening(
            &streams.stack,
            section.name.clone(),
            section.description.clone(),
            section.resources.clone(),
            RenderOptions::default(),
        ))
    });
    if let Some(stack) = &stack {
        children.push(stack.clone());
    }
    if let Some(section) = &script.service {
        let opts = RollingUpdateOptions {
            padding: 0,
            max_failure_messages: section.max_failure_messages,
            max_stopped_tasks: section.max_stopped_tasks,
        };
        children.push(Arc::new(RollingUpdateComponent::listening(&streams.service, opts)));
    }
    if let Some(section) = &script.stack_set {
        children.push(Arc::new(StackSetComponent::listening(
            &streams.stack_set,
            section.operation_id.clone(),
            section.description.clone(),
            RenderOptions::default(),
        )));
    }
    let root = MultiRenderer::new(children);
    info!(components = root.len(), events = script.events.len(), "replaying deployment");

    spawn_producer(Arc::clone(&streams), script.events, args.speed, cancel.clone());
    let finished = DoneSignal::new();
    let timed_out = spawn_deadline(args.timeout, cancel.clone(), finished.clone());

    let result = render(cancel, out, &root, interval);
    finished.close();

    match result {
        Err(ProgressError::Cancelled) if timed_out.load(Ordering::SeqCst) => {
            Err(ProgressError::Timeout(format!("{:?}", args.timeout)).into())
        }
        Err(err) => Err(err.into()),
        Ok(lines) => {
            debug!(lines, "replay finished");
            if stack.is_some_and(|stack| stack.has_failure()) {
                Ok(Outcome::DeploymentFailed)
            } else {
                Ok(Outcome::Completed)
            }
        }
    }
}

/// Publish every event after its delay, then end all streams.
fn spawn_producer(streams: Arc<Streams>, events: Vec<ScriptEvent>, speed: f64, cancel: CancellationToken) {
    thread::spawn(move || {
        let cancelled = cancel.receiver();
        for event in events {
            let delay = Duration::try_from_secs_f64(Duration::from_millis(event.after_ms).as_secs_f64() * speed)
                .unwrap_or(Duration::MAX);
            if matches!(cancelled.recv_timeout(delay), Err(RecvTimeoutError::Disconnected)) {
                debug!("replay cancelled, closing streams");
                break;
            }
            streams.publish(&event.payload);
        }
        streams.close();
    });
}

/// Cancel rendering once `timeout` elapses, unless it finished before.
fn spawn_deadline(timeout: Duration, cancel: CancellationToken, finished: DoneSignal) -> Arc<AtomicBool> {
    let timed_out = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&timed_out);
    thread::spawn(move || {
        let (cancelled, finished) = (cancel.receiver(), finished.receiver());
        select! {
            recv(cancelled) -> _ => {}
            recv(finished) -> _ => {}
            recv(after(timeout)) -> _ => {
                warn!(?timeout, "deadline exceeded, cancelling");
                flag.store(true, Ordering::SeqCst);
                cancel.cancel();
            }
        }
    });
    timed_out
}

fn ctrlc_handler(cancel: CancellationToken) -> Result<()> {
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .context("set Ctrl+C handler")
}

#[cfg(test)]
mod tests {
    use super::*;
    use console::strip_ansi_codes;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn script(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn args(file: &NamedTempFile, timeout: Duration) -> ReplayArgs {
        ReplayArgs {
            script: file.path().to_path_buf(),
            interval: Some(Duration::from_millis(2)),
            timeout,
            speed: 0.0,
            no_color: true,
        }
    }

    const STACK: &str = r#"{
        "stack": { "name": "demo", "description": "Creating demo",
                   "resources": { "ALB": "Application load balancer" } },
        "events": [
            { "kind": "stack", "logical_id": "ALB", "status": "CREATE_IN_PROGRESS" },
            { "kind": "stack", "logical_id": "Role", "status": "CREATE_IN_PROGRESS", "resource_type": "AWS::IAM::Role" },
            { "kind": "stack", "logical_id": "ALB", "status": "CREATE_COMPLETE" },
            { "kind": "stack", "logical_id": "Role", "status": "CREATE_COMPLETE" },
            { "kind": "stack", "logical_id": "demo", "status": "CREATE_COMPLETE" }
        ]
    }"#;

    #[test]
    fn replay_renders_final_state() {
        let file = script(STACK);
        let mut out: Vec<u8> = Vec::new();
        let outcome = replay(&args(&file, Duration::from_secs(30)), &mut out, &CancellationToken::new()).unwrap();
        assert_eq!(outcome, Outcome::Completed);

        let text = strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned();
        let last: Vec<&str> = text.lines().rev().take(3).collect();
        assert!(last[2].starts_with("- Creating demo"), "{text}");
        assert!(last[2].contains("[create complete]"));
        assert!(last[1].starts_with("  - Application load balancer"));
        assert!(last[0].starts_with("  - Role (AWS::IAM::Role)"));
    }

    #[test]
    fn failed_resource_is_reported() {
        let file = script(
            r#"{
            "stack": { "name": "demo", "description": "Creating demo" },
            "events": [
                { "kind": "stack", "logical_id": "Role", "status": "CREATE_FAILED", "reason": "denied" }
            ]
        }"#,
        );
        let mut out: Vec<u8> = Vec::new();
        let outcome = replay(&args(&file, Duration::from_secs(30)), &mut out, &CancellationToken::new()).unwrap();
        assert_eq!(outcome, Outcome::DeploymentFailed);
        assert_eq!(outcome.exit_code(), 3);
        let text = strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned();
        assert!(text.ends_with("    denied\n"), "{text}");
    }

    #[test]
    fn timeout_is_reported() {
        let file = script(
            r#"{
            "stack": { "name": "demo", "description": "Creating demo" },
            "events": [ { "after_ms": 60000, "kind": "stack", "logical_id": "A", "status": "CREATE_COMPLETE" } ]
        }"#,
        );
        let mut replay_args = args(&file, Duration::from_millis(50));
        replay_args.speed = 1.0;
        let mut out: Vec<u8> = Vec::new();
        let err = replay(&replay_args, &mut out, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err.downcast_ref::<ProgressError>(), Some(ProgressError::Timeout(_))));
        assert_eq!(crate::errors::exit_code(&err), 2);
    }

    #[test]
    fn cancellation_is_reported() {
        let file = script(STACK);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut out: Vec<u8> = Vec::new();
        let err = replay(&args(&file, Duration::from_secs(30)), &mut out, &cancel).unwrap_err();
        assert_eq!(crate::errors::exit_code(&err), 130);
        assert!(out.is_empty());
    }

    #[test]
    fn service_and_stack_set_sections() {
        let file = script(
            r#"{
            "service": { "max_failure_messages": 1 },
            "stack_set": { "description": "Update regions", "operation_id": "op-1" },
            "events": [
                { "kind": "service", "failure_events": ["first", "second"] },
                { "kind": "stack_set", "operation_id": "op-1", "status": "SUCCEEDED" }
            ]
        }"#,
        );
        let mut out: Vec<u8> = Vec::new();
        let outcome = replay(&args(&file, Duration::from_secs(30)), &mut out, &CancellationToken::new()).unwrap();
        assert_eq!(outcome, Outcome::Completed);

        let text = strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned();
        let last: Vec<&str> = text.lines().rev().take(4).collect();
        assert!(last[0].starts_with("- Update regions  [succeeded]"), "{text}");
        assert_eq!(last[1], "  - second");
        assert_eq!(last[2], "Latest failure event(s)");
        assert_eq!(last[3], "");
    }

    #[test]
    fn missing_script_is_a_config_error() {
        let replay_args = ReplayArgs {
            script: "/no/such/script.json".into(),
            interval: None,
            timeout: Duration::from_secs(1),
            speed: 1.0,
            no_color: true,
        };
        let err = replay(&replay_args, &mut Vec::<u8>::new(), &CancellationToken::new()).unwrap_err();
        assert_eq!(crate::errors::exit_code(&err), 4);
    }

    #[test]
    fn bar_prints_one_line() {
        let bar_args = BarArgs {
            data: vec![4, 2, 2, 1],
            width: 10,
            reps: ["W", "H", "A", "T"].map(String::from).to_vec(),
            empty: " ".to_string(),
        };
        let mut out = Vec::new();
        assert_eq!(bar(&bar_args, &mut out).unwrap(), Outcome::Completed);
        assert_eq!(out, b"WWWWWHHAAT\n");
    }
}
