use std::fmt;

/// Failure category for a call into an external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The request never produced an HTTP response.
    Network,
    /// The service rejected the credentials (or none were available).
    Unauthorized,
    /// The service answered with a non-success status.
    Status(u16),
    /// The response body did not match the expected shape.
    Decode,
    /// The request was rejected before it was sent.
    InvalidInput,
    /// The client is misconfigured (base URL, headers, runtime).
    Config,
}

/// Error surfaced by every service operation.
///
/// Carries the server-provided detail message when one was available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    kind: ServiceErrorKind,
    detail: Option<String>,
}

impl ServiceError {
    #[must_use]
    pub fn new(kind: ServiceErrorKind, detail: Option<String>) -> Self {
        let detail = detail
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self { kind, detail }
    }

    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Network, Some(detail.into()))
    }

    #[must_use]
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Unauthorized, Some(detail.into()))
    }

    #[must_use]
    pub fn status(code: u16, detail: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Status(code), Some(detail.into()))
    }

    #[must_use]
    pub fn decode(detail: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Decode, Some(detail.into()))
    }

    #[must_use]
    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::InvalidInput, Some(detail.into()))
    }

    #[must_use]
    pub fn config(detail: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Config, Some(detail.into()))
    }

    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        self.kind
    }

    /// Returns the human-readable detail, when the failure carried one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.kind, ServiceErrorKind::Unauthorized)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = match self.kind {
            ServiceErrorKind::Network => "service unreachable".to_string(),
            ServiceErrorKind::Unauthorized => "not authorized".to_string(),
            ServiceErrorKind::Status(code) => format!("service returned HTTP {code}"),
            ServiceErrorKind::Decode => "unexpected service response".to_string(),
            ServiceErrorKind::InvalidInput => "invalid request".to_string(),
            ServiceErrorKind::Config => "client misconfigured".to_string(),
        };

        match &self.detail {
            Some(detail) => write!(f, "{summary}: {detail}"),
            None => f.write_str(&summary),
        }
    }
}

impl std::error::Error for ServiceError {}
