use std::collections::BTreeMap;

use crate::config::ApiConfig;
use crate::error::ApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for one request.
///
/// `Content-Type` is left to the body encoder (JSON or multipart).
pub fn build_headers(
    config: &ApiConfig,
    requires_auth: bool,
) -> Result<BTreeMap<String, String>, ApiError> {
    let mut headers = BTreeMap::new();

    match config.bearer_token() {
        Some(token) => {
            headers.insert(HEADER_AUTHORIZATION.to_owned(), format!("Bearer {token}"));
        }
        None if requires_auth => return Err(ApiError::MissingAccessToken),
        None => {}
    }

    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());

    let user_agent = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), user_agent);

    for (key, value) in &config.extra_headers {
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(ApiError::InvalidHeader("empty header name".to_owned()));
        }
        headers.insert(key, value.trim().to_owned());
    }

    Ok(headers)
}

/// `docchat/<version> (<os>; <arch>)` using the target the binary was built for.
pub fn default_user_agent() -> String {
    format!(
        "docchat/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
