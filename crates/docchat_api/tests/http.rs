use docchat_api::{ApiClient, ApiConfig, ApiError, Endpoint};

fn client(token: Option<&str>) -> ApiClient {
    let mut config = ApiConfig::new("https://docs.example.com/api/");
    if let Some(token) = token {
        config = config.with_access_token(token);
    }
    ApiClient::new(config).expect("client")
}

#[test]
fn http_request_targets_endpoint_path_and_method() {
    let client = client(Some("tok"));
    let request = client
        .build_request(Endpoint::SendMessage("s-1"))
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(
        request.url().as_str(),
        "https://docs.example.com/api/chat/sessions/s-1/messages"
    );
    assert_eq!(request.method(), "POST");
    assert_eq!(
        request
            .headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok()),
        Some("Bearer tok")
    );
}

#[test]
fn http_delete_uses_delete_method() {
    let request = client(Some("tok"))
        .build_request(Endpoint::DeleteDocument("doc-9"))
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(request.method(), "DELETE");
    assert_eq!(request.url().path(), "/api/documents/doc-9");
}

#[test]
fn http_login_builds_without_token() {
    let request = client(None)
        .build_request(Endpoint::Login)
        .expect("login needs no token")
        .build()
        .expect("request");

    assert_eq!(request.url().path(), "/api/auth/login");
    assert!(request.headers().get("authorization").is_none());
}

#[test]
fn http_authenticated_endpoint_without_token_fails_before_sending() {
    let error = client(None)
        .build_request(Endpoint::ListSessions)
        .expect_err("token required");
    assert!(matches!(error, ApiError::MissingAccessToken));
}

#[test]
fn http_document_id_is_one_encoded_segment() {
    let request = client(Some("tok"))
        .build_request(Endpoint::GetDocument("../sessions"))
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(request.method(), "GET");
    assert_eq!(request.url().path(), "/api/documents/..%2Fsessions");
}

#[test]
fn http_client_rejects_unusable_base_url() {
    let error = ApiClient::new(ApiConfig::new("ftp://docs.example.com"))
        .expect_err("scheme must be http(s)");
    assert!(matches!(error, ApiError::InvalidBaseUrl(_)));
}
