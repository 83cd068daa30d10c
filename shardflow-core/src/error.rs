//! Error types shared by ports, processors and the executor.

use arrow::error::ArrowError;
use thiserror::Error;

/// Failure raised by a processor or by the port protocol between processors.
///
/// Nothing here is retried. `Config` is reported while building a stage and
/// `Internal` means two stages were composed incorrectly; both abort the run.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Invalid construction parameters (output count, key columns, types).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Broken contract between stages, e.g. a payload with the wrong chunk count.
    #[error("internal consistency violation: {0}")]
    Internal(String),

    /// Push into a port that is full or already finished.
    #[error("port error: {0}")]
    Port(String),

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// The cooperative executor made no progress for a full sweep.
    #[error("pipeline stalled, unfinished processors: {processors:?}")]
    Stalled { processors: Vec<String> },
}

impl ProcessorError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors that indicate a defect in how stages were wired.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

pub type Result<T, E = ProcessorError> = std::result::Result<T, E>;
