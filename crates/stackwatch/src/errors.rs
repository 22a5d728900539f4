//! Error handling and exit codes.

use stackwatch_core::constants::exit_codes;
use stackwatch_core::ProgressError;

use crate::script::ScriptError;

/// Map a rendering error to its exit code.
pub fn handle_error(err: &ProgressError) -> i32 {
    match err {
        ProgressError::Io(_) => exit_codes::ERROR_GENERIC,
        ProgressError::InvalidWidth(_)
        | ProgressError::MissingRepresentations { .. }
        | ProgressError::NegativeValue => exit_codes::ERROR_CONFIG,
        ProgressError::Cancelled => exit_codes::ERROR_CANCELED,
        ProgressError::Timeout(_) => exit_codes::ERROR_TIMEOUT,
    }
}

/// Exit code for any error surfaced by the application.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<ProgressError>() {
        handle_error(err)
    } else if err.downcast_ref::<ScriptError>().is_some() {
        exit_codes::ERROR_CONFIG
    } else {
        exit_codes::ERROR_GENERIC
    }
}
