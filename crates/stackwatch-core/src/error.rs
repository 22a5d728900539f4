//! Error type for the progress engine.

/// Errors raised while rendering deployment progress.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Writing to the output sink failed.
    #[error("write progress: {0}")]
    Io(#[from] std::io::Error),

    /// A summary bar was configured with a non-positive width.
    #[error("invalid width {0} for summary bar")]
    InvalidWidth(i64),

    /// A summary bar received fewer representations than data points.
    #[error("not enough representations: {representations} for {data} data points")]
    MissingRepresentations {
        /// Number of data points.
        data: usize,
        /// Number of representations supplied.
        representations: usize,
    },

    /// A summary bar received a negative magnitude.
    #[error("input data contains negative values")]
    NegativeValue,

    /// Rendering was cancelled by the caller.
    #[error("rendering cancelled")]
    Cancelled,

    /// The caller's deadline elapsed.
    #[error("rendering timed out after {0}")]
    Timeout(String),
}
