//! Recorded deployments replayed through the progress renderer.
//!
//! A script declares which components to show and the timed events to feed
//! them:
//!
//! ```json
//! {
//!   "stack": { "name": "demo-env", "description": "Creating the environment",
//!              "resources": { "ALB": "Application load balancer" } },
//!   "events": [
//!     { "after_ms": 100, "kind": "stack", "logical_id": "ALB", "status": "CREATE_IN_PROGRESS" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use stackwatch_core::constants::{DEFAULT_MAX_FAILURE_MESSAGES, DEFAULT_MAX_STOPPED_TASKS};
use stackwatch_core::{ServiceSnapshot, StackEvent, StackSetOpEvent};

/// Errors loading a replay script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("read script {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse script: {0}")]
    Parse(#[from] serde_json::Error),

    /// An event targets a component the script does not declare.
    #[error("event {index} is a {kind} event but the script has no {kind} section")]
    MissingSection { kind: &'static str, index: usize },
}

/// A whole replay script.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub stack: Option<StackSection>,
    #[serde(default)]
    pub service: Option<ServiceSection>,
    #[serde(default)]
    pub stack_set: Option<StackSetSection>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackSection {
    pub name: String,
    pub description: String,
    /// Descriptions of known resources, by logical id.
    #[serde(default)]
    pub resources: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSection {
    #[serde(default = "default_max_failure_messages")]
    pub max_failure_messages: usize,
    #[serde(default = "default_max_stopped_tasks")]
    pub max_stopped_tasks: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackSetSection {
    pub description: String,
    /// Only events of this operation are shown when set.
    #[serde(default)]
    pub operation_id: Option<String>,
}

/// One event, published `after_ms` milliseconds after the previous one.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    #[serde(default)]
    pub after_ms: u64,
    #[serde(flatten)]
    pub payload: Payload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Stack(StackEvent),
    Service(ServiceSnapshot),
    StackSet(StackSetOpEvent),
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Self::Stack(_) => "stack",
            Self::Service(_) => "service",
            Self::StackSet(_) => "stack_set",
        }
    }
}

fn default_max_failure_messages() -> usize {
    DEFAULT_MAX_FAILURE_MESSAGES
}

fn default_max_stopped_tasks() -> usize {
    DEFAULT_MAX_STOPPED_TASKS
}

impl Script {
    /// Read and validate the script at `path`.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        for (index, event) in self.events.iter().enumerate() {
            let declared = match event.payload {
                Payload::Stack(_) => self.stack.is_some(),
                Payload::Service(_) => self.service.is_some(),
                Payload::StackSet(_) => self.stack_set.is_some(),
            };
            if !declared {
                return Err(ScriptError::MissingSection {
                    kind: event.payload.kind(),
                    index,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackwatch_core::OperationStatus;

    const FULL: &str = r#"{
        "stack": { "name": "demo-env", "description": "Creating the environment",
                   "resources": { "ALB": "Application load balancer" } },
        "service": { "max_failure_messages": 2 },
        "stack_set": { "description": "Update regional resources" },
        "events": [
            { "after_ms": 100, "kind": "stack", "logical_id": "ALB", "status": "CREATE_IN_PROGRESS" },
            { "kind": "service", "deployments": [
                { "status": "PRIMARY", "task_def_revision": "3", "rollout_state": "IN_PROGRESS",
                  "desired": 2, "running": 1, "failed": 0, "pending": 1 } ],
              "failure_events": ["task failed to start"] },
            { "after_ms": 5, "kind": "stack_set", "operation_id": "1", "status": "RUNNING" }
        ]
    }"#;

    #[test]
    fn parses_every_section() {
        let script = Script::from_json(FULL).unwrap();
        let stack = script.stack.unwrap();
        assert_eq!(stack.name, "demo-env");
        assert_eq!(stack.resources["ALB"], "Application load balancer");

        let service = script.service.unwrap();
        assert_eq!(service.max_failure_messages, 2);
        assert_eq!(service.max_stopped_tasks, DEFAULT_MAX_STOPPED_TASKS);
        assert!(script.stack_set.unwrap().operation_id.is_none());

        assert_eq!(script.events.len(), 3);
        assert_eq!(script.events[0].after_ms, 100);
        assert_eq!(script.events[1].after_ms, 0);
        match &script.events[1].payload {
            Payload::Service(snapshot) => {
                assert_eq!(snapshot.deployments[0].desired, 2);
                assert_eq!(snapshot.failure_events, vec!["task failed to start"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &script.events[2].payload {
            Payload::StackSet(event) => assert_eq!(event.status, OperationStatus::Running),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn events_need_their_section() {
        let err = Script::from_json(
            r#"{ "events": [ { "kind": "stack", "logical_id": "ALB", "status": "CREATE_COMPLETE" } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScriptError::MissingSection { kind: "stack", index: 0 }));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = Script::from_json(r#"{ "events": [ { "kind": "pipeline" } ] }"#).unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[test]
    fn missing_file() {
        let err = Script::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().starts_with("read script /definitely/not/here.json"));
    }

    #[test]
    fn empty_script_is_valid() {
        let script = Script::from_json("{}").unwrap();
        assert!(script.events.is_empty());
        assert!(script.stack.is_none());
    }
}
