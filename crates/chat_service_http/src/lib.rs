//! HTTP-backed implementation of the `chat_service` contract.
//!
//! This adapter translates `docchat_api` transport results into
//! [`ServiceError`] kinds the conversation layer understands.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chat_service::{
    AccessToken, AccountService, ChatMessage, ChatSession, Document, DocumentStore,
    DocumentUpload, MessageExchange, ServiceError, SessionDirectory, SessionHistory,
    SessionListing, User,
};
use docchat_api::{ApiClient, ApiConfig, ApiError};
use reqwest::StatusCode;

/// Stable identifier used by startup service selection.
pub const HTTP_SERVICE_ID: &str = "http";

/// Runtime configuration for the HTTP service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpServiceConfig {
    pub base_url: Option<String>,
    pub access_token: Option<String>,
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpServiceConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_api_config(self) -> ApiConfig {
        let mut config = ApiConfig::default();

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(access_token) = self.access_token {
            config = config.with_access_token(access_token);
        }

        if let Some(user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

/// Service seams backed by the REST API.
///
/// The bearer token can be swapped at runtime after sign-in or sign-out;
/// requests already in flight keep the client they started with.
#[derive(Debug)]
pub struct HttpChatService {
    client: RwLock<Arc<ApiClient>>,
}

impl HttpChatService {
    pub fn new(config: HttpServiceConfig) -> Result<Self, ServiceError> {
        let client = ApiClient::new(config.into_api_config()).map_err(map_api_error)?;
        Ok(Self {
            client: RwLock::new(Arc::new(client)),
        })
    }

    pub fn base_url(&self) -> String {
        self.client().config().base_url.clone()
    }

    pub fn set_access_token(&self, access_token: Option<&str>) {
        let mut client = match self.client.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = client.with_access_token(access_token);
        *client = Arc::new(next);
    }

    fn client(&self) -> Arc<ApiClient> {
        let client = match self.client.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&client)
    }
}

#[async_trait]
impl SessionDirectory for HttpChatService {
    async fn list_sessions(&self) -> Result<SessionListing, ServiceError> {
        tracing::debug!("listing chat sessions");
        self.client()
            .list_sessions()
            .await
            .map_err(|error| log_failure("list sessions", error))
    }

    async fn create_session(&self, title: &str) -> Result<ChatSession, ServiceError> {
        tracing::debug!(title, "creating chat session");
        self.client()
            .create_session(title)
            .await
            .map_err(|error| log_failure("create session", error))
    }

    async fn session_history(&self, session_id: &str) -> Result<SessionHistory, ServiceError> {
        tracing::debug!(session_id, "loading session history");
        self.client()
            .session_history(session_id)
            .await
            .map_err(|error| log_failure("load session history", error))
    }
}

#[async_trait]
impl MessageExchange for HttpChatService {
    async fn send_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<ChatMessage, ServiceError> {
        tracing::debug!(session_id, chars = content.chars().count(), "sending message");
        self.client()
            .send_message(session_id, content)
            .await
            .map_err(|error| log_failure("send message", error))
    }
}

#[async_trait]
impl DocumentStore for HttpChatService {
    async fn list_documents(&self) -> Result<Vec<Document>, ServiceError> {
        self.client()
            .list_documents()
            .await
            .map_err(|error| log_failure("list documents", error))
    }

    async fn get_document(&self, document_id: &str) -> Result<Document, ServiceError> {
        self.client()
            .get_document(document_id)
            .await
            .map_err(|error| log_failure("get document", error))
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, ServiceError> {
        tracing::debug!(
            file_name = upload.file_name.as_str(),
            bytes = upload.bytes.len(),
            "uploading document"
        );
        self.client()
            .upload_document(upload)
            .await
            .map_err(|error| log_failure("upload document", error))
    }

    async fn delete_document(&self, document_id: &str) -> Result<(), ServiceError> {
        self.client()
            .delete_document(document_id)
            .await
            .map_err(|error| log_failure("delete document", error))
    }
}

#[async_trait]
impl AccountService for HttpChatService {
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ServiceError> {
        self.client()
            .login(email, password)
            .await
            .map_err(|error| log_failure("log in", error))
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, ServiceError> {
        self.client()
            .register(email, password, full_name)
            .await
            .map_err(|error| log_failure("register", error))
    }

    async fn current_user(&self, access_token: &str) -> Result<User, ServiceError> {
        self.client()
            .with_access_token(Some(access_token))
            .current_user()
            .await
            .map_err(|error| log_failure("fetch current user", error))
    }
}

fn log_failure(operation: &'static str, error: ApiError) -> ServiceError {
    let mapped = map_api_error(error);
    tracing::warn!(operation, error = %mapped, "service request failed");
    mapped
}

/// Classify a transport error into a service error kind.
pub fn map_api_error(error: ApiError) -> ServiceError {
    match error {
        ApiError::MissingAccessToken => ServiceError::unauthorized("not signed in"),
        ApiError::Status(StatusCode::UNAUTHORIZED, message) => ServiceError::unauthorized(message),
        ApiError::Status(status, message) => ServiceError::status(status.as_u16(), message),
        ApiError::Request(error) if error.is_decode() => ServiceError::decode(error.to_string()),
        ApiError::Request(error) if error.is_builder() => ServiceError::config(error.to_string()),
        ApiError::Request(error) => ServiceError::network(error.to_string()),
        ApiError::Serde(error) => ServiceError::decode(error.to_string()),
        ApiError::InvalidBaseUrl(message) | ApiError::InvalidHeader(message) => {
            ServiceError::config(message)
        }
    }
}
