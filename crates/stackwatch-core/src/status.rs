//! Status model for tracked resources and stack-set operations.
//!
//! Every tracked entity keeps an append-only [`StatusHistory`]. Each entry
//! holds a [`StatusValue`], which is either the implicit "not started"
//! seed, a raw CloudFormation-style resource status, or a stack-set
//! operation status. All variants share one classification so they can be
//! pretty-printed and colored by the same code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of a status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Nothing observed yet, or an unrecognised status.
    NotStarted,
    /// An operation is ongoing.
    InProgress,
    /// Terminal success.
    Success,
    /// Terminal failure.
    Failure,
    /// Terminal, the provider decided not to act.
    Skipped,
}

impl Classification {
    /// Whether no further transitions are expected from this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Skipped)
    }
}

/// Raw resource or stack status as reported by the provider, e.g.
/// `CREATE_IN_PROGRESS` or `UPDATE_ROLLBACK_COMPLETE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackStatus(String);

impl StackStatus {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw status code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify by suffix token.
    ///
    /// Rollbacks that complete are failures of the original change.
    #[must_use]
    pub fn classify(&self) -> Classification {
        let raw = self.0.as_str();
        if raw.ends_with("_FAILED") {
            Classification::Failure
        } else if raw.ends_with("_IN_PROGRESS") {
            Classification::InProgress
        } else if raw.ends_with("_COMPLETE") {
            if raw.contains("ROLLBACK") {
                Classification::Failure
            } else {
                Classification::Success
            }
        } else if raw.ends_with("_SUCCEEDED") {
            Classification::Success
        } else if raw.ends_with("_SKIPPED") {
            Classification::Skipped
        } else {
            Classification::NotStarted
        }
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a stack-set operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Queued,
    Running,
    Stopping,
    Succeeded,
    Failed,
    Stopped,
}

impl OperationStatus {
    #[must_use]
    pub fn classify(self) -> Classification {
        match self {
            Self::Queued | Self::Running | Self::Stopping => Classification::InProgress,
            Self::Succeeded => Classification::Success,
            Self::Failed | Self::Stopped => Classification::Failure,
        }
    }

    /// The provider's wire form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status value of any tracked entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatusValue {
    /// Seed value before any event arrived.
    NotStarted,
    /// Resource or stack status.
    Stack(StackStatus),
    /// Stack-set operation status.
    Operation(OperationStatus),
}

impl StatusValue {
    #[must_use]
    pub fn classify(&self) -> Classification {
        match self {
            Self::NotStarted => Classification::NotStarted,
            Self::Stack(status) => status.classify(),
            Self::Operation(status) => status.classify(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.classify() == Classification::Success
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.classify() == Classification::Failure
    }

    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.classify() == Classification::InProgress
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("NOT_STARTED"),
            Self::Stack(status) => status.fmt(f),
            Self::Operation(status) => status.fmt(f),
        }
    }
}

impl From<StackStatus> for StatusValue {
    fn from(status: StackStatus) -> Self {
        Self::Stack(status)
    }
}

impl From<OperationStatus> for StatusValue {
    fn from(status: OperationStatus) -> Self {
        Self::Operation(status)
    }
}

/// One observed status with its optional reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub value: StatusValue,
    pub reason: String,
}

impl StatusEntry {
    #[must_use]
    pub fn new(value: impl Into<StatusValue>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// How the latest status of a history should be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Latest entry succeeded and nothing ever failed.
    Success,
    /// Some entry in the history failed.
    Failure,
    /// Anything else.
    Neutral,
}

/// Append-only, never-empty sequence of status entries.
#[derive(Debug, Clone)]
pub struct StatusHistory {
    entries: Vec<StatusEntry>,
}

impl StatusHistory {
    /// A history seeded with a single `NotStarted` entry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: vec![StatusEntry::new(StatusValue::NotStarted, "")],
        }
    }

    pub fn push(&mut self, entry: StatusEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn latest(&self) -> &StatusEntry {
        // The seed entry is never removed.
        &self.entries[self.entries.len() - 1]
    }

    /// The entry received before the latest one, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&StatusEntry> {
        self.entries.len().checked_sub(2).map(|i| &self.entries[i])
    }

    #[must_use]
    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    /// Number of entries, including the seed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the seed entry is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any event was recorded beyond the seed.
    #[must_use]
    pub fn has_events(&self) -> bool {
        self.entries.len() > 1
    }

    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.entries.iter().any(|e| e.value.is_failure())
    }

    #[must_use]
    pub fn tone(&self) -> Tone {
        let has_failure = self.has_failure();
        if has_failure {
            Tone::Failure
        } else if self.latest().value.is_success() {
            Tone::Success
        } else {
            Tone::Neutral
        }
    }

    /// Latest status as `[lower case words]`, without color.
    #[must_use]
    pub fn latest_label(&self) -> String {
        format!("[{}]", humanize(&self.latest().value.to_string()))
    }

    /// Non-empty reasons of failed entries, in arrival order.
    #[must_use]
    pub fn failure_reasons(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.value.is_failure() && !e.reason.is_empty())
            .map(|e| e.reason.as_str())
            .collect()
    }
}

impl Default for StatusHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-case a provider status code and turn separators into spaces.
#[must_use]
pub fn humanize(raw: &str) -> String {
    raw.replace('_', " ").to_lowercase()
}
