use ::url::Url;

use crate::error::ApiError;

/// Default base URL of a locally running API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Normalize a base URL: blank input falls back to [`DEFAULT_BASE_URL`] and
/// trailing slashes are dropped.
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    base.trim_end_matches('/').to_string()
}

/// Join path segments onto the base URL, percent-encoding each segment.
///
/// Identifiers are appended as single segments, so an id containing `/`
/// cannot address a different resource.
pub fn endpoint_url(base_url: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let normalized = normalize_base_url(base_url);
    let mut url = Url::parse(&normalized)
        .map_err(|error| ApiError::InvalidBaseUrl(format!("{normalized}: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidBaseUrl(format!(
            "{normalized}: scheme must be http or https"
        )));
    }

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(format!("{normalized}: cannot be a base")))?;
        path.pop_if_empty();
        path.extend(segments);
    }

    Ok(url)
}
