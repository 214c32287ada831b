//! Transport-neutral contract for the document chat backend.
//!
//! This crate defines the wire data model shared by every implementation and
//! the async service seams the client drives: session directory, message
//! exchange, document storage, and accounts. It contains no transport code.

use std::sync::Arc;

use async_trait::async_trait;

mod error;
mod model;
mod upload;

pub use error::{ServiceError, ServiceErrorKind};
pub use model::{
    AccessToken, ChatMessage, ChatSession, Document, Role, SessionHistory, SessionListing,
    Source, Timestamp, User, PLACEHOLDER_ID_PREFIX,
};
pub use upload::{DocumentUpload, ALLOWED_EXTENSIONS};

/// Lists, creates, and loads chat sessions for the signed-in user.
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    async fn list_sessions(&self) -> Result<SessionListing, ServiceError>;

    async fn create_session(&self, title: &str) -> Result<ChatSession, ServiceError>;

    /// Returns the session with its messages in creation order.
    async fn session_history(&self, session_id: &str) -> Result<SessionHistory, ServiceError>;
}

/// Accepts a user message and returns the assistant reply.
#[async_trait]
pub trait MessageExchange: Send + Sync {
    async fn send_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<ChatMessage, ServiceError>;
}

/// Both chat seams, as consumed by the conversation driver.
pub trait ChatServices: SessionDirectory + MessageExchange {}

impl<T: SessionDirectory + MessageExchange + ?Sized> ChatServices for T {}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>, ServiceError>;

    async fn get_document(&self, document_id: &str) -> Result<Document, ServiceError>;

    async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, ServiceError>;

    async fn delete_document(&self, document_id: &str) -> Result<(), ServiceError>;
}

/// Credential exchange. Calls that need a bearer token receive it explicitly.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ServiceError>;

    async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, ServiceError>;

    async fn current_user(&self, access_token: &str) -> Result<User, ServiceError>;
}

#[async_trait]
impl<T: SessionDirectory + ?Sized> SessionDirectory for Arc<T> {
    async fn list_sessions(&self) -> Result<SessionListing, ServiceError> {
        (**self).list_sessions().await
    }

    async fn create_session(&self, title: &str) -> Result<ChatSession, ServiceError> {
        (**self).create_session(title).await
    }

    async fn session_history(&self, session_id: &str) -> Result<SessionHistory, ServiceError> {
        (**self).session_history(session_id).await
    }
}

#[async_trait]
impl<T: MessageExchange + ?Sized> MessageExchange for Arc<T> {
    async fn send_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<ChatMessage, ServiceError> {
        (**self).send_message(session_id, content).await
    }
}
