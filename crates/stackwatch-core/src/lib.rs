//! # stackwatch-core
//!
//! Building blocks shared by the progress renderer: the status model for
//! stack resources and stack-set operations, the stopwatch, the event types
//! streamed by deployments, and the done/cancellation signals used to
//! coordinate listening threads with the render driver.

pub mod constants;
pub mod error;
pub mod events;
pub mod signal;
pub mod status;
pub mod stopwatch;
pub mod stream;

// Re-exports
pub use constants::{exit_codes, MAX_CELL_LENGTH, NESTED_PADDING};
pub use error::ProgressError;
pub use events::{AlarmStatus, Deployment, ServiceSnapshot, StackEvent, StackSetOpEvent, StoppedTask};
pub use signal::{CancellationToken, DoneSignal};
pub use status::{Classification, OperationStatus, StackStatus, StatusEntry, StatusHistory, StatusValue};
pub use stopwatch::{Clock, StopWatch, SystemClock};
pub use stream::{Fanout, ServiceSubscriber, StackSetSubscriber, StackSubscriber};
