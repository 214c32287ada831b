//! Async driver tying the controller and session list to the chat services.
//!
//! Lock order is session list, then controller. Neither lock is held across
//! an `.await`, so concurrent selects race and the controller's request ids
//! decide which result wins.

use std::sync::{Arc, Mutex, MutexGuard};

use chat_service::{ChatServices, ChatSession};

use crate::controller::{ChatController, ChatState, Completion, TranscriptEntry};
use crate::error::ChatError;
use crate::session_list::SessionList;

#[derive(Clone)]
pub struct Conversation {
    services: Arc<dyn ChatServices>,
    controller: Arc<Mutex<ChatController>>,
    sessions: Arc<Mutex<SessionList>>,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("controller", &self.controller)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl Conversation {
    pub fn new(services: Arc<dyn ChatServices>) -> Self {
        Self {
            services,
            controller: Arc::new(Mutex::new(ChatController::new())),
            sessions: Arc::new(Mutex::new(SessionList::new())),
        }
    }

    /// Reload the session list. The held list is kept on failure.
    pub async fn refresh_sessions(&self) -> Result<(), ChatError> {
        tracing::debug!("refreshing session list");
        let mut fresh = SessionList::new();
        fresh.load(self.services.as_ref()).await?;
        *lock_unpoisoned(&self.sessions) = fresh;
        Ok(())
    }

    pub async fn select_session(&self, session_id: &str) -> Result<Completion, ChatError> {
        let request = lock_unpoisoned(&self.controller).select_session(session_id);
        tracing::debug!(
            session_id,
            request_id = request.request_id(),
            "loading session history"
        );

        let result = self.services.session_history(request.session_id()).await;
        lock_unpoisoned(&self.controller).on_history_loaded(&request, result)
    }

    pub fn start_new_chat(&self) {
        lock_unpoisoned(&self.controller).start_new_chat();
    }

    /// Send `content`, lazily creating a session when none is active.
    ///
    /// Returns `Completion::Discarded` when the user navigated away before
    /// the reply arrived.
    pub async fn send(&self, content: &str) -> Result<Completion, ChatError> {
        let mut ticket = lock_unpoisoned(&self.controller).begin_send(content)?;

        if let Some(title) = ticket.new_session_title().map(str::to_owned) {
            let created = self.services.create_session(&title).await;
            let mut sessions = lock_unpoisoned(&self.sessions);
            let mut controller = lock_unpoisoned(&self.controller);
            controller.on_session_created(&mut ticket, created, &mut sessions)?;
        }

        let Some(session_id) = ticket.session_id().map(str::to_owned) else {
            return Ok(Completion::Discarded);
        };

        tracing::debug!(
            session_id = session_id.as_str(),
            request_id = ticket.request_id(),
            "sending message"
        );
        let reply = self
            .services
            .send_message(&session_id, ticket.content())
            .await;
        lock_unpoisoned(&self.controller).on_reply(&ticket, reply)
    }

    #[must_use]
    pub fn state(&self) -> ChatState {
        lock_unpoisoned(&self.controller).state().clone()
    }

    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        lock_unpoisoned(&self.controller).transcript().to_vec()
    }

    #[must_use]
    pub fn active_session_id(&self) -> Option<String> {
        lock_unpoisoned(&self.controller)
            .active_session_id()
            .map(str::to_owned)
    }

    #[must_use]
    pub fn active_session(&self) -> Option<ChatSession> {
        lock_unpoisoned(&self.controller).active_session().cloned()
    }

    #[must_use]
    pub fn sessions(&self) -> Vec<ChatSession> {
        lock_unpoisoned(&self.sessions).sessions().to_vec()
    }

    /// Read access to the session list without cloning it.
    pub fn with_sessions<R>(&self, read: impl FnOnce(&SessionList) -> R) -> R {
        read(&lock_unpoisoned(&self.sessions))
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
