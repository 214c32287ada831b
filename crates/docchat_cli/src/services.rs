use std::sync::Arc;

use chat_service::{AccountService, ChatServices, DocumentStore, ServiceError};
use chat_service_http::{HttpChatService, HttpServiceConfig};
use chat_service_mock::MockChatService;
use docchat::{EnvConfig, ServiceKind};

/// The service seams the CLI drives, bound to one backend.
#[derive(Clone)]
pub struct Backend {
    kind: ServiceKind,
    pub chat: Arc<dyn ChatServices>,
    pub documents: Arc<dyn DocumentStore>,
    pub accounts: Arc<dyn AccountService>,
    http: Option<Arc<HttpChatService>>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

impl Backend {
    pub fn from_config(config: &EnvConfig) -> Result<Self, ServiceError> {
        match config.service {
            ServiceKind::Http => {
                let mut http = HttpServiceConfig::new().with_base_url(config.api_url.clone());
                if let Some(timeout) = config.timeout {
                    http = http.with_timeout(timeout);
                }
                Ok(Self::http(Arc::new(HttpChatService::new(http)?)))
            }
            ServiceKind::Mock => Ok(Self::mock(Arc::new(MockChatService::new()))),
        }
    }

    pub fn http(service: Arc<HttpChatService>) -> Self {
        tracing::debug!(base_url = service.base_url(), "using http backend");
        Self {
            kind: ServiceKind::Http,
            chat: Arc::clone(&service) as Arc<dyn ChatServices>,
            documents: Arc::clone(&service) as Arc<dyn DocumentStore>,
            accounts: Arc::clone(&service) as Arc<dyn AccountService>,
            http: Some(service),
        }
    }

    pub fn mock(service: Arc<MockChatService>) -> Self {
        tracing::debug!("using in-memory mock backend");
        Self {
            kind: ServiceKind::Mock,
            chat: Arc::clone(&service) as Arc<dyn ChatServices>,
            documents: Arc::clone(&service) as Arc<dyn DocumentStore>,
            accounts: service as Arc<dyn AccountService>,
            http: None,
        }
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Bearer token for subsequent requests. The mock does not check tokens.
    pub fn set_access_token(&self, access_token: Option<&str>) {
        if let Some(http) = &self.http {
            http.set_access_token(access_token);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use docchat::{EnvConfig, ServiceKind};

    use super::Backend;

    #[test]
    fn service_kind_selects_backend() {
        let mock = Backend::from_config(&EnvConfig {
            service: ServiceKind::Mock,
            ..EnvConfig::default()
        })
        .expect("mock backend should build");
        assert_eq!(mock.kind(), ServiceKind::Mock);

        let http = Backend::from_config(&EnvConfig {
            api_url: "https://docs.example.com/api".to_string(),
            timeout: Some(Duration::from_secs(5)),
            ..EnvConfig::default()
        })
        .expect("http backend should build");
        assert_eq!(http.kind(), ServiceKind::Http);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let error = Backend::from_config(&EnvConfig {
            api_url: "not a url".to_string(),
            ..EnvConfig::default()
        })
        .expect_err("invalid url should fail");
        assert!(error.to_string().contains("not a url"), "{error}");
    }
}
