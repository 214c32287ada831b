//! Deterministic in-memory implementation of the `chat_service` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and contract-level tests. Identifiers and timestamps are
//! sequential, failures can be injected per operation, and calls can be held
//! at a gate until the test releases them.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chat_service::{
    AccessToken, AccountService, ChatMessage, ChatSession, Document, DocumentStore,
    DocumentUpload, MessageExchange, Role, ServiceError, SessionDirectory, SessionHistory,
    SessionListing, Source, Timestamp, User,
};
use time::macros::datetime;
use time::Duration;
use tokio::sync::Semaphore;

/// Stable identifier used for explicit service selection.
pub const MOCK_SERVICE_ID: &str = "mock";

/// Bound on scheduler yields while waiting for a call to arrive.
const WAIT_FOR_CALLS_MAX_YIELDS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListSessions,
    CreateSession,
    SessionHistory,
    SendMessage,
    ListDocuments,
    GetDocument,
    UploadDocument,
    DeleteDocument,
    Login,
    Register,
    CurrentUser,
}

/// One recorded call, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ListSessions,
    CreateSession { title: String },
    SessionHistory { session_id: String },
    SendMessage { session_id: String, content: String },
    ListDocuments,
    GetDocument { document_id: String },
    UploadDocument { file_name: String },
    DeleteDocument { document_id: String },
    Login { email: String },
    Register { email: String, full_name: String },
    CurrentUser,
}

impl MockCall {
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::ListSessions => Operation::ListSessions,
            Self::CreateSession { .. } => Operation::CreateSession,
            Self::SessionHistory { .. } => Operation::SessionHistory,
            Self::SendMessage { .. } => Operation::SendMessage,
            Self::ListDocuments => Operation::ListDocuments,
            Self::GetDocument { .. } => Operation::GetDocument,
            Self::UploadDocument { .. } => Operation::UploadDocument,
            Self::DeleteDocument { .. } => Operation::DeleteDocument,
            Self::Login { .. } => Operation::Login,
            Self::Register { .. } => Operation::Register,
            Self::CurrentUser => Operation::CurrentUser,
        }
    }
}

/// Holds calls for one operation until released.
///
/// Each [`Gate::release`] lets exactly one waiting (or future) call through;
/// [`Gate::open`] lets every call through from then on.
#[derive(Debug, Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
}

impl Gate {
    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    pub fn open(&self) {
        self.permits.close();
    }
}

/// Produces the assistant reply text and citations for a user message.
pub type ReplyFn = dyn Fn(&str) -> (String, Vec<Source>) + Send + Sync;

#[derive(Debug, Clone)]
struct MockAccount {
    password: String,
    user: User,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    clock_seconds: i64,
    sessions: Vec<ChatSession>,
    messages: HashMap<String, Vec<ChatMessage>>,
    documents: Vec<Document>,
    accounts: HashMap<String, MockAccount>,
    tokens: HashMap<String, String>,
    failures: HashMap<Operation, VecDeque<ServiceError>>,
    calls: Vec<MockCall>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn tick(&mut self) -> Timestamp {
        self.clock_seconds += 1;
        Timestamp::from_datetime(
            datetime!(2026-01-01 09:00 UTC) + Duration::seconds(self.clock_seconds),
        )
    }

    fn take_failure(&mut self, operation: Operation) -> Result<(), ServiceError> {
        match self
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn session_index(&self, session_id: &str) -> Option<usize> {
        self.sessions
            .iter()
            .position(|session| session.id == session_id)
    }

    fn insert_session(&mut self, title: &str) -> ChatSession {
        let now = self.tick();
        let session = ChatSession {
            id: self.next_id("session"),
            user_id: "mock-user".to_string(),
            title: title.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.sessions.insert(0, session.clone());
        self.messages.insert(session.id.clone(), Vec::new());
        session
    }

    fn push_message(
        &mut self,
        session_id: &str,
        role: Role,
        content: &str,
        sources: Option<Vec<Source>>,
    ) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id("msg"),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            created_at: self.tick(),
            sources,
        };
        self.messages
            .entry(session_id.to_string())
            .or_default()
            .push(message.clone());
        message
    }

    fn touch_session(&mut self, index: usize) {
        let now = self.tick();
        let mut session = self.sessions.remove(index);
        session.updated_at = now;
        self.sessions.insert(0, session);
    }
}

/// Deterministic in-memory backend used by tests and `DOCCHAT_SERVICE=mock`.
pub struct MockChatService {
    state: Mutex<MockState>,
    gates: Mutex<HashMap<Operation, Gate>>,
    reply: Box<ReplyFn>,
}

impl std::fmt::Debug for MockChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockChatService")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for MockChatService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatService {
    #[must_use]
    pub fn new() -> Self {
        Self::with_reply(default_reply)
    }

    /// Creates a mock whose assistant replies come from `reply`.
    #[must_use]
    pub fn with_reply<F>(reply: F) -> Self
    where
        F: Fn(&str) -> (String, Vec<Source>) + Send + Sync + 'static,
    {
        Self {
            state: Mutex::new(MockState::default()),
            gates: Mutex::new(HashMap::new()),
            reply: Box::new(reply),
        }
    }

    /// Inserts a session with alternating user/assistant turns.
    pub fn seed_session(&self, title: &str, turns: &[(Role, &str)]) -> ChatSession {
        let mut state = lock_unpoisoned(&self.state);
        let session = state.insert_session(title);
        for (role, content) in turns {
            state.push_message(&session.id, *role, content, None);
        }
        session
    }

    pub fn seed_document(&self, filename: &str, bytes: usize) -> Document {
        let mut state = lock_unpoisoned(&self.state);
        insert_document(&mut state, filename, bytes)
    }

    pub fn seed_account(&self, email: &str, password: &str, full_name: Option<&str>) -> User {
        let mut state = lock_unpoisoned(&self.state);
        insert_account(&mut state, email, password, full_name)
    }

    /// Issues a token for an existing account without recording a call.
    #[must_use]
    pub fn issue_token(&self, email: &str) -> Option<String> {
        let mut state = lock_unpoisoned(&self.state);
        if !state.accounts.contains_key(email) {
            return None;
        }
        let token = state.next_id("mock-token");
        state.tokens.insert(token.clone(), email.to_string());
        Some(token)
    }

    /// Makes the next call of `operation` fail with `error`. Queued failures
    /// are consumed in order.
    pub fn fail_next(&self, operation: Operation, error: ServiceError) {
        lock_unpoisoned(&self.state)
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Holds every later call of `operation` until the returned gate lets it
    /// through.
    pub fn hold(&self, operation: Operation) -> Gate {
        let gate = Gate {
            permits: Arc::new(Semaphore::new(0)),
        };
        lock_unpoisoned(&self.gates).insert(operation, gate.clone());
        gate
    }

    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        lock_unpoisoned(&self.state).calls.clone()
    }

    #[must_use]
    pub fn call_count(&self, operation: Operation) -> usize {
        lock_unpoisoned(&self.state)
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    #[must_use]
    pub fn sessions(&self) -> Vec<ChatSession> {
        lock_unpoisoned(&self.state).sessions.clone()
    }

    #[must_use]
    pub fn messages(&self, session_id: &str) -> Vec<ChatMessage> {
        lock_unpoisoned(&self.state)
            .messages
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Yields to the scheduler until `count` calls of `operation` were
    /// recorded. Returns false when the bound is exhausted first.
    pub async fn wait_for_calls(&self, operation: Operation, count: usize) -> bool {
        for _ in 0..WAIT_FOR_CALLS_MAX_YIELDS {
            if self.call_count(operation) >= count {
                return true;
            }
            tokio::task::yield_now().await;
        }
        self.call_count(operation) >= count
    }

    async fn enter(&self, call: MockCall) -> Result<MutexGuard<'_, MockState>, ServiceError> {
        let operation = call.operation();
        lock_unpoisoned(&self.state).calls.push(call);

        let gate = lock_unpoisoned(&self.gates).get(&operation).cloned();
        if let Some(gate) = gate {
            // A closed semaphore means the gate was opened.
            if let Ok(permit) = gate.permits.acquire().await {
                permit.forget();
            }
        }

        let mut state = lock_unpoisoned(&self.state);
        state.take_failure(operation)?;
        Ok(state)
    }
}

#[async_trait]
impl SessionDirectory for MockChatService {
    async fn list_sessions(&self) -> Result<SessionListing, ServiceError> {
        let state = self.enter(MockCall::ListSessions).await?;
        Ok(SessionListing {
            sessions: state.sessions.clone(),
            total: state.sessions.len(),
        })
    }

    async fn create_session(&self, title: &str) -> Result<ChatSession, ServiceError> {
        let mut state = self
            .enter(MockCall::CreateSession {
                title: title.to_string(),
            })
            .await?;
        Ok(state.insert_session(title))
    }

    async fn session_history(&self, session_id: &str) -> Result<SessionHistory, ServiceError> {
        let state = self
            .enter(MockCall::SessionHistory {
                session_id: session_id.to_string(),
            })
            .await?;
        let index = state
            .session_index(session_id)
            .ok_or_else(|| ServiceError::status(404, "Session not found"))?;
        Ok(SessionHistory {
            session: state.sessions[index].clone(),
            messages: state.messages.get(session_id).cloned().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl MessageExchange for MockChatService {
    async fn send_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<ChatMessage, ServiceError> {
        let mut state = self
            .enter(MockCall::SendMessage {
                session_id: session_id.to_string(),
                content: content.to_string(),
            })
            .await?;
        let index = state
            .session_index(session_id)
            .ok_or_else(|| ServiceError::status(404, "Session not found"))?;

        let (reply, sources) = (self.reply)(content);
        state.push_message(session_id, Role::User, content, None);
        let sources = if sources.is_empty() {
            None
        } else {
            Some(sources)
        };
        let assistant = state.push_message(session_id, Role::Assistant, &reply, sources);
        state.touch_session(index);
        Ok(assistant)
    }
}

#[async_trait]
impl DocumentStore for MockChatService {
    async fn list_documents(&self) -> Result<Vec<Document>, ServiceError> {
        let state = self.enter(MockCall::ListDocuments).await?;
        Ok(state.documents.clone())
    }

    async fn get_document(&self, document_id: &str) -> Result<Document, ServiceError> {
        let state = self
            .enter(MockCall::GetDocument {
                document_id: document_id.to_string(),
            })
            .await?;
        state
            .documents
            .iter()
            .find(|document| document.id == document_id)
            .cloned()
            .ok_or_else(|| ServiceError::status(404, "Document not found"))
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, ServiceError> {
        let mut state = self
            .enter(MockCall::UploadDocument {
                file_name: upload.file_name.clone(),
            })
            .await?;
        Ok(insert_document(
            &mut state,
            &upload.file_name,
            upload.bytes.len(),
        ))
    }

    async fn delete_document(&self, document_id: &str) -> Result<(), ServiceError> {
        let mut state = self
            .enter(MockCall::DeleteDocument {
                document_id: document_id.to_string(),
            })
            .await?;
        let index = state
            .documents
            .iter()
            .position(|document| document.id == document_id)
            .ok_or_else(|| ServiceError::status(404, "Document not found"))?;
        state.documents.remove(index);
        Ok(())
    }
}

#[async_trait]
impl AccountService for MockChatService {
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ServiceError> {
        let mut state = self
            .enter(MockCall::Login {
                email: email.to_string(),
            })
            .await?;
        let valid = state
            .accounts
            .get(email)
            .is_some_and(|account| account.password == password);
        if !valid {
            return Err(ServiceError::unauthorized("Incorrect email or password"));
        }

        let token = state.next_id("mock-token");
        state.tokens.insert(token.clone(), email.to_string());
        Ok(AccessToken {
            access_token: token,
            token_type: "bearer".to_string(),
        })
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, ServiceError> {
        let mut state = self
            .enter(MockCall::Register {
                email: email.to_string(),
                full_name: full_name.to_string(),
            })
            .await?;
        if state.accounts.contains_key(email) {
            return Err(ServiceError::status(400, "Email already registered"));
        }
        let full_name = Some(full_name).filter(|name| !name.trim().is_empty());
        Ok(insert_account(&mut state, email, password, full_name))
    }

    async fn current_user(&self, access_token: &str) -> Result<User, ServiceError> {
        let state = self.enter(MockCall::CurrentUser).await?;
        state
            .tokens
            .get(access_token)
            .and_then(|email| state.accounts.get(email))
            .map(|account| account.user.clone())
            .ok_or_else(|| ServiceError::unauthorized("Could not validate credentials"))
    }
}

fn insert_document(state: &mut MockState, filename: &str, bytes: usize) -> Document {
    let file_type = Path::new(filename)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| format!(".{}", extension.to_ascii_lowercase()))
        .unwrap_or_default();
    let document = Document {
        id: state.next_id("doc"),
        user_id: "mock-user".to_string(),
        filename: filename.to_string(),
        file_type,
        file_size: Some(bytes as u64),
        upload_date: state.tick(),
        processed: true,
        chunk_count: (bytes / 1000).max(1) as u32,
        error_message: None,
    };
    state.documents.push(document.clone());
    document
}

fn insert_account(
    state: &mut MockState,
    email: &str,
    password: &str,
    full_name: Option<&str>,
) -> User {
    let user = User {
        id: state.next_id("user"),
        email: email.to_string(),
        full_name: full_name.map(str::to_string),
    };
    state.accounts.insert(
        email.to_string(),
        MockAccount {
            password: password.to_string(),
            user: user.clone(),
        },
    );
    user
}

fn default_reply(content: &str) -> (String, Vec<Source>) {
    (
        format!("According to your documents: {content}"),
        vec![Source {
            doc_id: "doc-handbook".to_string(),
            filename: "handbook.pdf".to_string(),
            chunk_index: 0,
            page_number: Some(1),
        }],
    )
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use chat_service::ServiceErrorKind;

    use super::*;

    #[tokio::test]
    async fn send_message_records_both_turns_and_moves_session_to_front() {
        let service = MockChatService::new();
        let older = service.seed_session("Older", &[]);
        let newer = service.seed_session("Newer", &[]);
        assert_eq!(service.sessions()[0].id, newer.id);

        let reply = service
            .send_message(&older.id, "hello")
            .await
            .expect("send succeeds");

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "According to your documents: hello");
        assert_eq!(reply.sources().len(), 1);
        assert_eq!(service.messages(&older.id).len(), 2);
        assert_eq!(service.sessions()[0].id, older.id);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let service = MockChatService::new();
        service.fail_next(Operation::ListSessions, ServiceError::network("offline"));

        let first = service.list_sessions().await;
        assert_matches!(first, Err(error) if error.kind() == ServiceErrorKind::Network);
        assert!(service.list_sessions().await.is_ok());
        assert_eq!(service.call_count(Operation::ListSessions), 2);
    }

    #[tokio::test]
    async fn unknown_session_history_is_not_found() {
        let service = MockChatService::new();
        let error = service
            .session_history("missing")
            .await
            .expect_err("missing session");
        assert_eq!(error.kind(), ServiceErrorKind::Status(404));
    }

    #[tokio::test]
    async fn held_calls_wait_for_release() {
        let service = Arc::new(MockChatService::new());
        let gate = service.hold(Operation::CreateSession);

        let task = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.create_session("Held").await }
        });

        assert!(service.wait_for_calls(Operation::CreateSession, 1).await);
        assert!(service.sessions().is_empty());

        gate.release();
        let created = task
            .await
            .expect("task joins")
            .expect("create succeeds");
        assert_eq!(created.title, "Held");
    }

    #[tokio::test]
    async fn login_and_current_user_round_trip() {
        let service = MockChatService::new();
        let user = service.seed_account("ada@example.com", "hunter22", Some("Ada"));

        let wrong = service.login("ada@example.com", "nope").await;
        assert_matches!(wrong, Err(error) if error.is_unauthorized());

        let token = service
            .login("ada@example.com", "hunter22")
            .await
            .expect("login succeeds");
        let me = service
            .current_user(&token.access_token)
            .await
            .expect("token resolves");
        assert_eq!(me, user);
    }

    #[tokio::test]
    async fn documents_upload_and_delete() {
        let service = MockChatService::new();
        let upload = DocumentUpload::new("guide.pdf", vec![0; 2500]).expect("valid upload");

        let document = service.upload_document(upload).await.expect("uploaded");
        assert_eq!(document.file_type, ".pdf");
        assert_eq!(document.chunk_count, 2);

        service
            .delete_document(&document.id)
            .await
            .expect("deleted");
        let error = service
            .delete_document(&document.id)
            .await
            .expect_err("already deleted");
        assert_eq!(error.kind(), ServiceErrorKind::Status(404));
    }
}
