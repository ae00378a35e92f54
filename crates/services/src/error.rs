//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by quiz sessions.
///
/// None of these end a session: after any of them the session is unchanged
/// (apart from the selection notice) and the next action can proceed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no option selected")]
    NoSelection,
    #[error("option {index} is out of range for a question with {options} options")]
    InvalidInput { index: usize, options: usize },
    #[error("questions unavailable: {0}")]
    SourceUnavailable(String),
    #[error("failed to record attempt: {0}")]
    SinkWriteFailed(#[source] StorageError),
    #[error("session already finished")]
    NotActive,
    #[error("question already graded")]
    AlreadyGraded,
    #[error("question not graded yet")]
    NotGraded,
    #[error("already at the first question")]
    AtFirstQuestion,
}
