//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, and the engine's
//! domain errors so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use essence_core::{
    AbilityError, BalanceError, ErrorSeverity, EssenceError, PassiveError, PedestalError,
};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("essence worker command channel closed")]
    CommandChannelClosed,

    #[error("essence worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("essence worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires a {0} before building")]
    MissingCollaborator(&'static str),

    #[error(transparent)]
    Ability(#[from] AbilityError),

    #[error(transparent)]
    Passive(#[from] PassiveError),

    #[error(transparent)]
    Pedestal(#[from] PedestalError),

    #[error(transparent)]
    Balance(#[from] BalanceError),
}

impl EssenceError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Fatal
            }
            Self::MissingCollaborator(_) => ErrorSeverity::Validation,
            Self::Repository(e) => e.severity(),
            Self::Ability(e) => e.severity(),
            Self::Passive(e) => e.severity(),
            Self::Pedestal(e) => e.severity(),
            Self::Balance(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingCollaborator(_) => "RUNTIME_MISSING_COLLABORATOR",
            Self::Repository(e) => e.error_code(),
            Self::Ability(e) => e.error_code(),
            Self::Passive(e) => e.error_code(),
            Self::Pedestal(e) => e.error_code(),
            Self::Balance(e) => e.error_code(),
        }
    }
}
