use std::fs;
use std::sync::Arc;

use chat_service::{AccountService, Role, ServiceError};
use chat_service_mock::{MockChatService, Operation};
use docchat::render::RenderOptions;
use docchat::AuthContext;
use docchat_cli::app::{App, PendingAuth, COMMAND_PROMPT, PASSWORD_PROMPT};
use docchat_cli::services::Backend;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use time::UtcOffset;
use token_store::TokenStore;

struct Harness {
    _dir: TempDir,
    service: Arc<MockChatService>,
    app: App,
}

fn harness() -> Harness {
    let service = Arc::new(MockChatService::new());
    service.seed_account("ada@example.com", "hunter22", Some("Ada Lovelace"));

    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = TokenStore::new(dir.path().join("token.json"));
    let accounts: Arc<dyn AccountService> = Arc::clone(&service) as Arc<dyn AccountService>;
    let app = App::new(
        Backend::mock(Arc::clone(&service)),
        AuthContext::new(accounts, store),
        RenderOptions {
            width: 80,
            offset: UtcOffset::UTC,
        },
    );

    Harness {
        _dir: dir,
        service,
        app,
    }
}

#[tokio::test]
async fn start_without_saved_token_is_anonymous() {
    let mut h = harness();

    let out = h.app.start().await;

    assert_eq!(
        out,
        vec![
            "docchat (mock backend). Type /help for commands.",
            "Not signed in. Use /login <email> or /register.",
        ]
    );
}

#[tokio::test]
async fn plain_text_sends_and_prints_reply_with_sources() {
    let mut h = harness();

    let out = h.app.on_line("What is the refund policy?").await;

    assert!(out[0].starts_with("You · "), "{out:?}");
    assert_eq!(
        &out[1..],
        &[
            "  What is the refund policy?",
            "",
            "Assistant · 9:00 AM",
            "  According to your documents: What is the refund policy?",
            "  Sources:",
            "    - handbook.pdf (p. 1)",
        ]
    );
    assert_eq!(h.service.sessions()[0].title, "What is the refund policy?");
}

#[tokio::test]
async fn sessions_and_open_by_number() {
    let mut h = harness();
    h.service
        .seed_session("Leave policy", &[(Role::User, "How many days?")]);
    h.service.seed_session("Expenses", &[]);

    let listed = h.app.on_line("/sessions").await;
    assert_eq!(listed, vec!["  1. Expenses", "  2. Leave policy"]);

    let opened = h.app.on_line("/open 2").await;
    assert_eq!(opened[0], "== Leave policy ==");
    assert_eq!(opened[2], "  How many days?");

    let listed = h.app.on_line("/sessions").await;
    assert_eq!(listed, vec!["  1. Expenses", "* 2. Leave policy"]);

    assert_eq!(
        h.app.on_line("/open 9").await,
        vec!["No chat numbered 9. Try /sessions."]
    );
}

#[tokio::test]
async fn open_unknown_id_reports_not_found() {
    let mut h = harness();

    let out = h.app.on_line("/open session-404").await;

    assert_eq!(
        out,
        vec!["Error: service returned HTTP 404: Session not found"]
    );
}

#[tokio::test]
async fn login_reads_password_from_next_line() {
    let mut h = harness();

    assert!(h.app.on_line("/login ada@example.com").await.is_empty());
    assert_eq!(h.app.prompt(), PASSWORD_PROMPT);
    assert_eq!(
        h.app.pending_auth(),
        Some(&PendingAuth::Login {
            email: "ada@example.com".to_string()
        })
    );

    let out = h.app.on_line("hunter22").await;
    assert_eq!(out[0], "Signed in as Ada Lovelace <ada@example.com>.");
    assert_eq!(h.app.prompt(), COMMAND_PROMPT);
    assert!(h.app.auth().is_authenticated());
    assert_eq!(
        h.app.on_line("/whoami").await,
        vec![
            "Signed in as Ada Lovelace <ada@example.com>.",
            "0 documents, 0 chats",
        ]
    );

    // Password lines are never sent as chat messages.
    assert_eq!(h.service.call_count(Operation::SendMessage), 0);
}

#[tokio::test]
async fn failed_login_returns_to_command_prompt() {
    let mut h = harness();

    h.app.on_line("/login ada@example.com").await;
    let out = h.app.on_line("wrong").await;

    assert_eq!(
        out,
        vec!["Sign-in failed: not authorized: Incorrect email or password"]
    );
    assert_eq!(h.app.prompt(), COMMAND_PROMPT);
    assert!(!h.app.auth().is_authenticated());
}

#[tokio::test]
async fn saved_sign_in_is_restored_on_start() {
    let mut h = harness();
    h.app.on_line("/login ada@example.com").await;
    h.app.on_line("hunter22").await;
    let store = h.app.auth().store().clone();

    let accounts: Arc<dyn AccountService> = Arc::clone(&h.service) as Arc<dyn AccountService>;
    let mut restarted = App::new(
        Backend::mock(Arc::clone(&h.service)),
        AuthContext::new(accounts, store),
        RenderOptions {
            width: 80,
            offset: UtcOffset::UTC,
        },
    );
    let out = restarted.start().await;

    assert_eq!(out[1], "Signed in as Ada Lovelace <ada@example.com>.");
    assert_eq!(out[2], "No chats yet. Type a message to start one.");
}

#[tokio::test]
async fn logout_resets_conversation() {
    let mut h = harness();
    h.app.on_line("/login ada@example.com").await;
    h.app.on_line("hunter22").await;
    h.app.on_line("hello").await;

    assert_eq!(h.app.on_line("/logout").await, vec!["Signed out."]);

    assert!(!h.app.auth().is_authenticated());
    assert!(h.app.conversation().transcript().is_empty());
    assert!(h.app.conversation().sessions().is_empty());
    assert_eq!(h.app.on_line("/whoami").await, vec!["Not signed in."]);
}

#[tokio::test]
async fn whoami_summarizes_documents_and_chats() {
    let mut h = harness();
    h.app.on_line("/login ada@example.com").await;
    h.app.on_line("hunter22").await;
    h.service.seed_document("handbook.pdf", 2048);
    h.service.seed_document("benefits.docx", 1024);
    h.service.seed_session("Leave policy", &[]);

    assert_eq!(
        h.app.on_line("/whoami").await,
        vec![
            "Signed in as Ada Lovelace <ada@example.com>.",
            "2 documents, 1 chat",
        ]
    );
}

#[tokio::test]
async fn whoami_reports_count_failures_after_the_user() {
    let mut h = harness();
    h.app.on_line("/login ada@example.com").await;
    h.app.on_line("hunter22").await;
    h.service
        .fail_next(Operation::ListDocuments, ServiceError::network("offline"));

    let out = h.app.on_line("/whoami").await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0], "Signed in as Ada Lovelace <ada@example.com>.");
    assert!(out[1].starts_with("Error: "), "{out:?}");
}

#[tokio::test]
async fn documents_upload_list_and_delete() {
    let mut h = harness();
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let pdf = dir.path().join("handbook.pdf");
    fs::write(&pdf, vec![b'%'; 2048]).expect("write pdf");
    let txt = dir.path().join("notes.txt");
    fs::write(&txt, "plain").expect("write txt");

    assert_eq!(h.app.on_line("/docs").await, vec!["No documents uploaded."]);

    let rejected = h.app.on_line(&format!("/upload {}", txt.display())).await;
    assert_eq!(
        rejected,
        vec!["Error: invalid request: unsupported file type '.txt'; expected one of: .pdf, .docx"]
    );
    assert_eq!(h.service.call_count(Operation::UploadDocument), 0);

    let uploaded = h.app.on_line(&format!("/upload {}", pdf.display())).await;
    let document_id = h
        .app
        .on_line("/docs")
        .await
        .first()
        .and_then(|row| row.split_whitespace().next().map(str::to_owned))
        .expect("one document row");
    assert_eq!(
        uploaded[0],
        format!("Uploaded handbook.pdf as {document_id}.")
    );

    assert_eq!(
        h.app.on_line(&format!("/delete {document_id}")).await,
        vec![format!("Deleted document {document_id}.")]
    );
    assert_eq!(h.app.on_line("/docs").await, vec!["No documents uploaded."]);
}

#[tokio::test]
async fn usage_unknown_and_quit() {
    let mut h = harness();

    assert_eq!(h.app.on_line("/open").await, vec!["Usage: /open <n|id>"]);
    assert_eq!(
        h.app.on_line("/bogus").await,
        vec!["Unknown command: /bogus. Type /help for commands."]
    );
    assert!(h.app.on_line("   ").await.is_empty());
    assert!(h.app.on_line("/help").await[0].starts_with("Commands:"));

    assert!(!h.app.should_exit());
    h.app.on_line("/quit").await;
    assert!(h.app.should_exit());
}
