use chat_service::{
    AccessToken, ChatMessage, ChatSession, Document, DocumentUpload, SessionHistory,
    SessionListing, User,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::endpoint::Endpoint;
use crate::error::{parse_error_message, ApiError};
use crate::headers::build_headers;
use crate::payload::{CreateSessionRequest, LoginRequest, RegisterRequest, SendMessageRequest};
use crate::url::endpoint_url;

/// Multipart field name the upload endpoint reads the file from.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Fails early when the base URL cannot address endpoints.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        endpoint_url(&config.base_url, &[])?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Same connection pool, different bearer token.
    pub fn with_access_token(&self, access_token: Option<&str>) -> Self {
        let config = match access_token {
            Some(token) => self.config.clone().with_access_token(token),
            None => self.config.clone().without_access_token(),
        };
        Self {
            http: self.http.clone(),
            config,
        }
    }

    pub fn build_headers(&self, requires_auth: bool) -> Result<HeaderMap, ApiError> {
        let headers = build_headers(&self.config, requires_auth)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value)
                    .map_err(|_| ApiError::InvalidHeader(format!("invalid header value for {key}")))?,
            );
        }
        Ok(out)
    }

    /// Request builder with URL, method and headers set; the body is up to
    /// the caller.
    pub fn build_request(&self, endpoint: Endpoint<'_>) -> Result<RequestBuilder, ApiError> {
        let url = endpoint_url(&self.config.base_url, &endpoint.segments())?;
        let headers = self.build_headers(endpoint.requires_auth())?;
        Ok(self
            .http
            .request(endpoint.method(), url)
            .headers(headers))
    }

    pub async fn list_sessions(&self) -> Result<SessionListing, ApiError> {
        let request = self.build_request(Endpoint::ListSessions)?;
        execute_json(request).await
    }

    pub async fn create_session(&self, title: &str) -> Result<ChatSession, ApiError> {
        let body = CreateSessionRequest {
            title: title.to_owned(),
        };
        let request = self.build_request(Endpoint::CreateSession)?.json(&body);
        execute_json(request).await
    }

    pub async fn session_history(&self, session_id: &str) -> Result<SessionHistory, ApiError> {
        let request = self.build_request(Endpoint::SessionHistory(session_id))?;
        execute_json(request).await
    }

    pub async fn send_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<ChatMessage, ApiError> {
        let body = SendMessageRequest {
            session_id: session_id.to_owned(),
            content: content.to_owned(),
        };
        let request = self
            .build_request(Endpoint::SendMessage(session_id))?
            .json(&body);
        execute_json(request).await
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        let request = self.build_request(Endpoint::ListDocuments)?;
        execute_json(request).await
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Document, ApiError> {
        let request = self.build_request(Endpoint::GetDocument(document_id))?;
        execute_json(request).await
    }

    pub async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, ApiError> {
        let DocumentUpload {
            file_name,
            content_type,
            bytes,
        } = upload;
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(ApiError::from)?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        let request = self
            .build_request(Endpoint::UploadDocument)?
            .multipart(form);
        execute_json(request).await
    }

    pub async fn delete_document(&self, document_id: &str) -> Result<(), ApiError> {
        let request = self.build_request(Endpoint::DeleteDocument(document_id))?;
        execute_empty(request).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError> {
        let request = self
            .build_request(Endpoint::Login)?
            .json(&LoginRequest { email, password });
        execute_json(request).await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, ApiError> {
        let request = self.build_request(Endpoint::Register)?.json(&RegisterRequest {
            email,
            password,
            full_name,
        });
        execute_json(request).await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        let request = self.build_request(Endpoint::CurrentUser)?;
        execute_json(request).await
    }
}

async fn execute_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await?;
    let body = read_success_body(response).await?;
    serde_json::from_str(&body).map_err(ApiError::from)
}

async fn execute_empty(request: RequestBuilder) -> Result<(), ApiError> {
    let response = request.send().await?;
    read_success_body(response).await.map(|_| ())
}

async fn read_success_body(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiError::Status(status, parse_error_message(status, &body)))
    }
}
