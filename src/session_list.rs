//! In-memory cache of the signed-in user's chat sessions.

use chat_service::{ChatSession, ServiceError, SessionDirectory, SessionListing};

/// Sessions in display order, newest first as returned by the service.
///
/// Newly created sessions are prepended; there is no deduplication beyond
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionList {
    sessions: Vec<ChatSession>,
    total: usize,
}

impl SessionList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every session and replace the held set. On failure the previous
    /// set is kept.
    pub async fn load<D>(&mut self, directory: &D) -> Result<(), ServiceError>
    where
        D: SessionDirectory + ?Sized,
    {
        let listing = directory.list_sessions().await?;
        self.replace(listing);
        Ok(())
    }

    pub fn replace(&mut self, listing: SessionListing) {
        let SessionListing { sessions, total } = listing;
        self.total = total.max(sessions.len());
        self.sessions = sessions;
    }

    pub fn prepend(&mut self, session: ChatSession) {
        self.sessions.insert(0, session);
        self.total += 1;
    }

    #[must_use]
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|session| session.id == session_id)
    }

    /// Zero-based position lookup, as shown in numbered listings.
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<&ChatSession> {
        self.sessions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Server-reported total from the last load plus local prepends.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }
}
