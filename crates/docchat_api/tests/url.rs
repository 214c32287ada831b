use docchat_api::{endpoint_url, normalize_base_url, ApiError, Endpoint, DEFAULT_BASE_URL};

#[test]
fn url_blank_base_falls_back_to_default() {
    assert_eq!(normalize_base_url(""), DEFAULT_BASE_URL);
    assert_eq!(normalize_base_url("   "), DEFAULT_BASE_URL);
}

#[test]
fn url_trailing_slashes_are_dropped() {
    assert_eq!(
        normalize_base_url("https://docs.example.com/api//"),
        "https://docs.example.com/api"
    );
}

#[test]
fn url_segments_append_after_base_path() {
    let url = endpoint_url("https://docs.example.com/api/", &["chat", "sessions", "s1"])
        .expect("valid url");
    assert_eq!(url.as_str(), "https://docs.example.com/api/chat/sessions/s1");
}

#[test]
fn url_identifiers_are_percent_encoded_as_one_segment() {
    let url = endpoint_url("http://localhost:8000", &["documents", "a/b c"]).expect("valid url");
    assert_eq!(url.as_str(), "http://localhost:8000/documents/a%2Fb%20c");
}

#[test]
fn url_rejects_non_http_schemes() {
    let error = endpoint_url("ftp://files.example.com", &["documents"]).expect_err("ftp rejected");
    assert!(matches!(error, ApiError::InvalidBaseUrl(_)));

    let error = endpoint_url("not a url", &["documents"]).expect_err("garbage rejected");
    assert!(matches!(error, ApiError::InvalidBaseUrl(_)));
}

#[test]
fn url_default_base_reaches_api_routers() {
    let url = endpoint_url(DEFAULT_BASE_URL, &Endpoint::ListSessions.segments()).expect("valid url");
    assert_eq!(url.path(), "/api/chat/sessions");

    let url = endpoint_url(DEFAULT_BASE_URL, &Endpoint::Login.segments()).expect("valid url");
    assert_eq!(url.as_str(), "http://localhost:8000/api/auth/login");
}
