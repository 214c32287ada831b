//! Active session state machine.
//!
//! Every network-bound operation is split in two: a `begin` step that
//! mutates local state and hands back a ticket, and an `on_*` completion step
//! that takes the ticket together with the service result. Completions whose
//! ticket is no longer current are discarded without touching state.

use chat_service::{
    ChatMessage, ChatSession, ServiceError, SessionHistory, Timestamp, PLACEHOLDER_ID_PREFIX,
};

use crate::error::ChatError;
use crate::session_list::SessionList;

pub type RequestId = u64;

/// Character budget for titles derived from a first message.
pub const SESSION_TITLE_MAX_CHARS: usize = 30;
pub const SESSION_TITLE_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatState {
    /// No session selected; the next send creates one.
    NoSession,
    /// History fetch in flight for `session_id`.
    Loading {
        session_id: String,
        request_id: RequestId,
    },
    /// Idle and accepting input.
    Ready,
    /// A send is in flight.
    Sending { request_id: RequestId },
}

/// Two-phase status of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub message: ChatMessage,
    pub delivery: Delivery,
}

impl TranscriptEntry {
    fn confirmed(message: ChatMessage) -> Self {
        Self {
            message,
            delivery: Delivery::Confirmed,
        }
    }
}

/// Whether a completion was applied or dropped as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded,
}

/// Issued by [`ChatController::select_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    request_id: RequestId,
    session_id: String,
}

impl HistoryRequest {
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Issued by [`ChatController::begin_send`]; carries everything the driver
/// needs for the network calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    request_id: RequestId,
    placeholder_id: String,
    content: String,
    session_id: Option<String>,
    new_session_title: Option<String>,
}

impl SendTicket {
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn placeholder_id(&self) -> &str {
        &self.placeholder_id
    }

    /// Trimmed message content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Target session, once known.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Title to create a session with, when the send started without one.
    #[must_use]
    pub fn new_session_title(&self) -> Option<&str> {
        match self.session_id {
            Some(_) => None,
            None => self.new_session_title.as_deref(),
        }
    }
}

#[derive(Debug)]
pub struct ChatController {
    state: ChatState,
    transcript: Vec<TranscriptEntry>,
    active_session_id: Option<String>,
    active_session: Option<ChatSession>,
    next_request_id: RequestId,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ChatState::NoSession,
            transcript: Vec::new(),
            active_session_id: None,
            active_session: None,
            next_request_id: 1,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    #[must_use]
    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    /// Session record of the active session, once history or creation has
    /// returned it.
    #[must_use]
    pub fn active_session(&self) -> Option<&ChatSession> {
        self.active_session.as_ref()
    }

    #[must_use]
    pub fn is_sending(&self) -> bool {
        matches!(self.state, ChatState::Sending { .. })
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ChatState::Loading { .. })
    }

    pub fn select_session(&mut self, session_id: impl Into<String>) -> HistoryRequest {
        let session_id = session_id.into();
        let request_id = self.issue_request_id();

        self.transcript.clear();
        self.active_session_id = Some(session_id.clone());
        self.active_session = None;
        self.state = ChatState::Loading {
            session_id: session_id.clone(),
            request_id,
        };

        HistoryRequest {
            request_id,
            session_id,
        }
    }

    pub fn on_history_loaded(
        &mut self,
        request: &HistoryRequest,
        result: Result<SessionHistory, ServiceError>,
    ) -> Result<Completion, ChatError> {
        if !self.is_current_history(request) {
            tracing::warn!(
                session_id = request.session_id.as_str(),
                request_id = request.request_id,
                "discarding stale session history"
            );
            return Ok(Completion::Discarded);
        }

        self.state = ChatState::Ready;
        match result {
            Ok(history) => {
                self.transcript = history
                    .messages
                    .into_iter()
                    .map(TranscriptEntry::confirmed)
                    .collect();
                self.active_session = Some(history.session);
                Ok(Completion::Applied)
            }
            Err(error) => {
                self.transcript.clear();
                Err(ChatError::Service(error))
            }
        }
    }

    /// Drop the active session. In-flight selects and sends become stale.
    pub fn start_new_chat(&mut self) {
        self.state = ChatState::NoSession;
        self.transcript.clear();
        self.active_session_id = None;
        self.active_session = None;
    }

    /// Validate `content`, append the optimistic user message, and enter
    /// `Sending`. Rejections leave every field untouched.
    pub fn begin_send(&mut self, content: &str) -> Result<SendTicket, ChatError> {
        match self.state {
            ChatState::Sending { .. } => return Err(ChatError::ConcurrentSend),
            ChatState::Loading { .. } => return Err(ChatError::HistoryLoading),
            ChatState::NoSession | ChatState::Ready => {}
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::Validation);
        }

        let request_id = self.issue_request_id();
        let placeholder_id = new_placeholder_id();
        let session_id = self.active_session_id.clone();
        let new_session_title = match session_id {
            Some(_) => None,
            None => Some(session_title_for(content)),
        };

        self.transcript.push(TranscriptEntry {
            message: ChatMessage::placeholder(
                placeholder_id.clone(),
                session_id.clone().unwrap_or_default(),
                content,
                Timestamp::now(),
            ),
            delivery: Delivery::Pending,
        });
        self.state = ChatState::Sending { request_id };

        Ok(SendTicket {
            request_id,
            placeholder_id,
            content: content.to_owned(),
            session_id,
            new_session_title,
        })
    }

    /// Apply the result of lazily creating a session for `ticket`.
    ///
    /// A created session is published to `sessions` even when the send went
    /// stale, since it exists server-side.
    pub fn on_session_created(
        &mut self,
        ticket: &mut SendTicket,
        result: Result<ChatSession, ServiceError>,
        sessions: &mut SessionList,
    ) -> Result<Completion, ChatError> {
        let current = self.is_current_send(ticket);

        match result {
            Ok(session) => {
                tracing::info!(
                    session_id = session.id.as_str(),
                    "created chat session"
                );
                ticket.session_id = Some(session.id.clone());
                sessions.prepend(session.clone());

                if !current {
                    tracing::warn!(
                        session_id = session.id.as_str(),
                        "session created for a send that is no longer active"
                    );
                    return Ok(Completion::Discarded);
                }

                if let Some(entry) = self.placeholder_mut(&ticket.placeholder_id) {
                    entry.message.session_id = session.id.clone();
                }
                self.active_session_id = Some(session.id.clone());
                self.active_session = Some(session);
                Ok(Completion::Applied)
            }
            Err(error) => {
                if !current {
                    tracing::warn!(%error, "discarding session creation failure for stale send");
                    return Ok(Completion::Discarded);
                }
                self.fail_send(ticket);
                Err(ChatError::Service(error))
            }
        }
    }

    /// Apply the service reply to `ticket`'s send.
    pub fn on_reply(
        &mut self,
        ticket: &SendTicket,
        result: Result<ChatMessage, ServiceError>,
    ) -> Result<Completion, ChatError> {
        if !self.is_current_send(ticket) {
            tracing::warn!(
                request_id = ticket.request_id,
                session_id = ticket.session_id().unwrap_or_default(),
                "discarding reply for a send that is no longer active"
            );
            return Ok(Completion::Discarded);
        }

        match result {
            Ok(reply) => {
                if let Some(entry) = self.placeholder_mut(&ticket.placeholder_id) {
                    entry.delivery = Delivery::Confirmed;
                }
                self.transcript.push(TranscriptEntry::confirmed(reply));
                self.state = ChatState::Ready;
                Ok(Completion::Applied)
            }
            Err(error) => {
                self.fail_send(ticket);
                Err(ChatError::Service(error))
            }
        }
    }

    fn fail_send(&mut self, ticket: &SendTicket) {
        if let Some(entry) = self.placeholder_mut(&ticket.placeholder_id) {
            entry.delivery = Delivery::Failed;
        }
        self.state = ChatState::Ready;
    }

    fn placeholder_mut(&mut self, placeholder_id: &str) -> Option<&mut TranscriptEntry> {
        self.transcript
            .iter_mut()
            .rev()
            .find(|entry| entry.message.id == placeholder_id)
    }

    fn is_current_history(&self, request: &HistoryRequest) -> bool {
        matches!(
            &self.state,
            ChatState::Loading { request_id, .. } if *request_id == request.request_id
        )
    }

    fn is_current_send(&self, ticket: &SendTicket) -> bool {
        matches!(
            self.state,
            ChatState::Sending { request_id } if request_id == ticket.request_id
        )
    }

    fn issue_request_id(&mut self) -> RequestId {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        request_id
    }
}

/// Title for a session created from its first message: the first 30
/// characters, with `...` appended when the message is longer.
#[must_use]
pub fn session_title_for(content: &str) -> String {
    let content = content.trim();
    if content.chars().count() <= SESSION_TITLE_MAX_CHARS {
        return content.to_owned();
    }

    let mut title = content
        .chars()
        .take(SESSION_TITLE_MAX_CHARS)
        .collect::<String>();
    title.push_str(SESSION_TITLE_ELLIPSIS);
    title
}

fn new_placeholder_id() -> String {
    format!("{PLACEHOLDER_ID_PREFIX}{}", uuid::Uuid::new_v4())
}
