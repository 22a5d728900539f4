//! Layout constants and exit codes.

/// Extra indentation applied to every nesting level of a component tree.
pub const NESTED_PADDING: usize = 2;

/// Maximum number of characters of a failure reason shown on one line.
pub const MAX_CELL_LENGTH: usize = 70;

/// Minimum width of a table cell, including the gap.
pub const TABLE_MIN_CELL_WIDTH: usize = 20;

/// Number of blank columns between two table cells.
pub const TABLE_GAP_WIDTH: usize = 2;

/// Default number of failure messages retained by a rolling update.
pub const DEFAULT_MAX_FAILURE_MESSAGES: usize = 5;

/// Default number of stopped tasks retained by a rolling update.
pub const DEFAULT_MAX_STOPPED_TASKS: usize = 3;

/// Number of characters of a task id shown in the stopped tasks section.
pub const SHORT_TASK_ID_LENGTH: usize = 8;

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// The caller's deadline elapsed before rendering finished.
    pub const ERROR_TIMEOUT: i32 = 2;
    /// At least one tracked resource ended in a failed state.
    pub const ERROR_DEPLOYMENT_FAILED: i32 = 3;
    /// Invalid configuration or input.
    pub const ERROR_CONFIG: i32 = 4;
    /// Rendering cancelled by the user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}
