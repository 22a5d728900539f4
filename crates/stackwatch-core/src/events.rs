//! Events streamed by deployments.

use serde::{Deserialize, Serialize};

use crate::status::{OperationStatus, StackStatus, StatusEntry};

/// A change in status of one resource of a stack, or of the stack itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEvent {
    /// Logical resource id; equals the stack name for stack-level events.
    pub logical_id: String,
    #[serde(default)]
    pub physical_id: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    pub status: StackStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

impl StackEvent {
    #[must_use]
    pub fn new(logical_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            physical_id: None,
            resource_type: None,
            status: StackStatus::new(status),
            reason: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// The status entry this event contributes to a history.
    #[must_use]
    pub fn entry(&self) -> StatusEntry {
        StatusEntry::new(self.status.clone(), self.reason.clone().unwrap_or_default())
    }
}

/// One deployment of a service, as reported during a rolling update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// `PRIMARY` or `ACTIVE`.
    pub status: String,
    /// Task definition ARN, or a bare revision number.
    pub task_def_revision: String,
    /// `IN_PROGRESS`, `COMPLETED` or `FAILED`.
    pub rollout_state: String,
    pub desired: u32,
    pub running: u32,
    pub failed: u32,
    pub pending: u32,
}

/// Latest state of a CloudWatch alarm attached to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmStatus {
    pub name: String,
    /// `OK`, `ALARM` or `INSUFFICIENT_DATA`.
    pub state: String,
}

/// A task that stopped during the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppedTask {
    pub id: String,
    #[serde(default)]
    pub last_status: String,
    #[serde(default)]
    pub desired_status: String,
    pub stop_reason: String,
    /// Seconds since the epoch at which the task started stopping.
    #[serde(default)]
    pub stopping_at: u64,
}

/// A snapshot of a service while a rolling update is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    /// Failure events observed since the previous snapshot.
    #[serde(default)]
    pub failure_events: Vec<String>,
    #[serde(default)]
    pub alarms: Vec<AlarmStatus>,
    #[serde(default)]
    pub stopped_tasks: Vec<StoppedTask>,
}

/// A status change of a stack-set operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSetOpEvent {
    pub operation_id: String,
    pub status: OperationStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

impl StackSetOpEvent {
    #[must_use]
    pub fn new(operation_id: impl Into<String>, status: OperationStatus) -> Self {
        Self {
            operation_id: operation_id.into(),
            status,
            reason: None,
        }
    }

    #[must_use]
    pub fn entry(&self) -> StatusEntry {
        StatusEntry::new(self.status, self.reason.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusValue;

    #[test]
    fn stack_event_entry() {
        let ev = StackEvent::new("ALB", "CREATE_FAILED").with_reason("quota exceeded");
        let entry = ev.entry();
        assert!(entry.value.is_failure());
        assert_eq!(entry.reason, "quota exceeded");
    }

    #[test]
    fn stack_event_without_reason() {
        let entry = StackEvent::new("ALB", "CREATE_IN_PROGRESS").entry();
        assert!(entry.reason.is_empty());
        assert!(entry.value.in_progress());
    }

    #[test]
    fn stack_set_entry() {
        let entry = StackSetOpEvent::new("op-1", OperationStatus::Succeeded).entry();
        assert_eq!(entry.value, StatusValue::Operation(OperationStatus::Succeeded));
    }
}
