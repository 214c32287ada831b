use std::fs;
use std::sync::Arc;

use assert_matches::assert_matches;
use chat_service::{AccountService, ServiceErrorKind};
use chat_service_mock::{MockChatService, Operation};
use docchat::{AuthContext, AuthError};
use tempfile::TempDir;
use token_store::TokenStore;

fn context(service: &Arc<MockChatService>) -> (TempDir, AuthContext) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = TokenStore::new(dir.path().join("docchat").join("token.json"));
    let accounts: Arc<dyn AccountService> = Arc::clone(service) as Arc<dyn AccountService>;
    (dir, AuthContext::new(accounts, store))
}

fn seeded() -> Arc<MockChatService> {
    let service = Arc::new(MockChatService::new());
    service.seed_account("ada@example.com", "hunter22", Some("Ada Lovelace"));
    service
}

#[tokio::test]
async fn init_without_token_is_anonymous() {
    let service = seeded();
    let (_dir, mut auth) = context(&service);

    assert_eq!(auth.init().await.expect("init succeeds"), None);
    assert!(!auth.is_authenticated());
    assert_eq!(service.call_count(Operation::CurrentUser), 0);
}

#[tokio::test]
async fn login_persists_token_for_next_init() {
    let service = seeded();
    let (_dir, mut auth) = context(&service);

    let user = auth
        .login("ada@example.com", "hunter22")
        .await
        .expect("login succeeds")
        .clone();
    assert_eq!(user.full_name.as_deref(), Some("Ada Lovelace"));
    assert!(auth.token().is_some());
    assert!(auth.store().path().exists());

    let accounts: Arc<dyn AccountService> = Arc::clone(&service) as Arc<dyn AccountService>;
    let mut restored = AuthContext::new(accounts, auth.store().clone());
    let again = restored.init().await.expect("init succeeds").cloned();

    assert_eq!(again, Some(user));
    assert_eq!(restored.token(), auth.token());
}

#[tokio::test]
async fn rejected_token_is_cleared_on_init() {
    let service = seeded();
    let (_dir, mut auth) = context(&service);
    auth.store().save("revoked-token", "bearer").expect("save");

    assert_eq!(auth.init().await.expect("init succeeds"), None);

    assert!(!auth.store().path().exists());
    assert_eq!(service.call_count(Operation::CurrentUser), 1);
}

#[tokio::test]
async fn expired_token_is_cleared_without_calling_service() {
    let service = seeded();
    let (_dir, mut auth) = context(&service);
    // {"alg":"HS256"} . {"sub":"ada@example.com","exp":1}
    let expired = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJhZGFAZXhhbXBsZS5jb20iLCJleHAiOjF9.sig";
    auth.store().save(expired, "bearer").expect("save");

    assert_eq!(auth.init().await.expect("init succeeds"), None);

    assert!(!auth.store().path().exists());
    assert_eq!(service.call_count(Operation::CurrentUser), 0);
}

#[tokio::test]
async fn corrupt_token_file_is_discarded() {
    let service = seeded();
    let (_dir, mut auth) = context(&service);
    let path = auth.store().path().to_path_buf();
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "not json").expect("write");

    assert_eq!(auth.init().await.expect("init succeeds"), None);
    assert!(!path.exists());
}

#[tokio::test]
async fn wrong_password_surfaces_unauthorized_and_stores_nothing() {
    let service = seeded();
    let (_dir, mut auth) = context(&service);

    let error = auth
        .login("ada@example.com", "wrong")
        .await
        .expect_err("login fails");

    assert_matches!(error, AuthError::Service(error) if error.is_unauthorized());
    assert!(!auth.is_authenticated());
    assert!(!auth.store().path().exists());
}

#[tokio::test]
async fn blank_credentials_are_rejected_locally() {
    let service = seeded();
    let (_dir, mut auth) = context(&service);

    assert_matches!(
        auth.login("  ", "hunter22").await,
        Err(AuthError::MissingCredentials)
    );
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn register_signs_in_and_duplicate_fails() {
    let service = Arc::new(MockChatService::new());
    let (_dir, mut auth) = context(&service);

    let user = auth
        .register("grace@example.com", "cobol-4ever", "Grace Hopper")
        .await
        .expect("register succeeds")
        .clone();
    assert_eq!(user.email, "grace@example.com");
    assert!(auth.is_authenticated());

    let error = auth
        .register("grace@example.com", "again", "Grace")
        .await
        .expect_err("duplicate fails");
    assert_matches!(error, AuthError::Service(error) if error.kind() == ServiceErrorKind::Status(400));
}

#[tokio::test]
async fn logout_clears_token_and_user() {
    let service = seeded();
    let (_dir, mut auth) = context(&service);
    auth.login("ada@example.com", "hunter22")
        .await
        .expect("login succeeds");

    auth.logout().expect("logout succeeds");

    assert!(!auth.is_authenticated());
    assert_eq!(auth.token(), None);
    assert!(!auth.store().path().exists());
    auth.logout().expect("second logout is a no-op");
}
