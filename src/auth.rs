//! Signed-in user and bearer token, held explicitly.

use std::sync::Arc;

use chat_service::{AccountService, User};
use time::OffsetDateTime;
use token_store::{StoredToken, TokenStore, TokenStoreError};

use crate::error::AuthError;

pub struct AuthContext {
    accounts: Arc<dyn AccountService>,
    store: TokenStore,
    token: Option<String>,
    user: Option<User>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("store", &self.store)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl AuthContext {
    pub fn new(accounts: Arc<dyn AccountService>, store: TokenStore) -> Self {
        Self {
            accounts,
            store,
            token: None,
            user: None,
        }
    }

    /// Restore the session from the persisted token.
    ///
    /// Expired, unreadable, or rejected tokens are cleared and the context
    /// stays anonymous; only token file I/O failures are returned.
    pub async fn init(&mut self) -> Result<Option<&User>, AuthError> {
        self.token = None;
        self.user = None;

        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(error @ TokenStoreError::JsonParse { .. }) => {
                tracing::warn!(%error, "discarding unreadable token file");
                self.store.clear()?;
                None
            }
            Err(error) => return Err(error.into()),
        };

        let Some(stored) = stored else {
            return Ok(None);
        };

        if stored.is_expired_at(OffsetDateTime::now_utc()) {
            tracing::info!("stored token has expired");
            self.store.clear()?;
            return Ok(None);
        }

        match self.accounts.current_user(&stored.access_token).await {
            Ok(user) => {
                tracing::info!(user_id = user.id.as_str(), "restored signed-in session");
                self.token = Some(stored.access_token);
                Ok(Some(&*self.user.insert(user)))
            }
            Err(error) => {
                tracing::warn!(%error, "stored token was rejected; signing out");
                self.store.clear()?;
                Ok(None)
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let issued = self.accounts.login(email, password).await?;
        let StoredToken { access_token, .. } =
            self.store.save(&issued.access_token, &issued.token_type)?;

        match self.accounts.current_user(&access_token).await {
            Ok(user) => {
                tracing::info!(user_id = user.id.as_str(), "signed in");
                self.token = Some(access_token);
                Ok(&*self.user.insert(user))
            }
            Err(error) => {
                self.store.clear()?;
                self.token = None;
                self.user = None;
                Err(error.into())
            }
        }
    }

    /// Create the account, then sign in with the same credentials.
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<&User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let created = self
            .accounts
            .register(email, password, full_name.trim())
            .await?;
        tracing::info!(user_id = created.id.as_str(), "registered account");
        self.login(email, password).await
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.token = None;
        self.user = None;
        self.store.clear()?;
        tracing::info!("signed out");
        Ok(())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn store(&self) -> &TokenStore {
        &self.store
    }
}
