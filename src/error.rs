//! Error types surfaced to the UI layer.

use chat_service::ServiceError;
use thiserror::Error;
use token_store::TokenStoreError;

/// Failure of a chat operation. None of these is fatal: the controller is
/// always left in a re-enterable state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message is empty")]
    Validation,

    #[error("a message is already being sent")]
    ConcurrentSend,

    #[error("session history is still loading")]
    HistoryLoading,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ChatError {
    /// Whether the failure came from the backend rather than local checks.
    #[must_use]
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service(_))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}
