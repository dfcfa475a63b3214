//! Error type shared by every terminal operation.
//!
//! Stage functions supplied by callers report failures through `anyhow`; the
//! evaluator wraps those into [`StreamError::OperationFailure`] tagged with the
//! name of the stage that raised them, so callers can tell a failing `map`
//! from a failing `peek` without inspecting the message.

use thiserror::Error;

/// Errors surfaced by pipeline evaluation.
#[derive(Debug, Error)]
pub enum StreamError {
    /// An argument violated its contract (e.g. zero worker threads).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A terminal operation was invoked on a pipeline value that already ran one.
    #[error("pipeline has already been consumed by a terminal operation")]
    AlreadyConsumed,

    /// A caller-supplied function failed mid-traversal; evaluation was aborted.
    #[error("{stage} function failed: {source}")]
    OperationFailure {
        /// Name of the stage or terminal whose function failed.
        stage: &'static str,
        /// The caller's error.
        #[source]
        source: anyhow::Error,
    },

    /// A type-erased element did not have the type its stage expected.
    #[error("type mismatch: expected element of type {expected}")]
    TypeMismatch {
        /// Name of the expected type.
        expected: &'static str,
    },

    /// The dedicated worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl StreamError {
    pub(crate) fn failure(stage: &'static str, source: anyhow::Error) -> Self {
        Self::OperationFailure { stage, source }
    }

    /// `true` if this error came from a caller-supplied function.
    #[must_use]
    pub fn is_operation_failure(&self) -> bool {
        matches!(self, Self::OperationFailure { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StreamError>;
