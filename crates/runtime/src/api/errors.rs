//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, the game session and repositories
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use boss_core::ActionError;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("game worker command channel closed")]
    CommandChannelClosed,

    #[error("game worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("game worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RuntimeError {
    /// The rejected action, if the game itself refused the request.
    pub fn action_error(&self) -> Option<&ActionError> {
        match self {
            RuntimeError::Action(err) => Some(err),
            _ => None,
        }
    }
}
