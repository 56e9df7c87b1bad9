//! Session store: who is signed in, persisted across restarts.
//!
//! ARCHITECTURE
//! ============
//! The in-memory session lives in a `tokio::sync::watch` channel so screens
//! (or the CLI) can wait on `is_loading` and react to sign-in/out without
//! polling. Credentials are held as one `Option<Credentials>`, which makes a
//! partially authenticated session unrepresentable: user, access token and
//! refresh token are always set and cleared together.
//!
//! Every mutating operation returns a [`CredentialsChanged`] value. The store
//! never touches the request pipeline; the composition layer in `app`
//! forwards the new access token.
//!
//! ERROR HANDLING
//! ==============
//! Storage failures are asymmetric:
//! - `set_auth` propagates them and leaves memory unchanged.
//! - `clear_auth` logs them and clears memory anyway.
//! - `load_auth` logs them and treats the device as signed out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::storage::{KeyValueStore, StorageError};
use crate::types::User;

pub const KEY_USER: &str = "user";
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
const SESSION_KEYS: [&str; 3] = [KEY_USER, KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN];

// =============================================================================
// SESSION
// =============================================================================

/// A complete credential set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl Credentials {
    /// Combine optional parts. Only a full set (non-empty tokens) yields credentials.
    #[must_use]
    pub fn from_parts(user: Option<User>, access_token: Option<String>, refresh_token: Option<String>) -> Option<Self> {
        let access_token = access_token.filter(|t| !t.is_empty())?;
        let refresh_token = refresh_token.filter(|t| !t.is_empty())?;
        Some(Self { user: user?, access_token, refresh_token })
    }
}

/// Snapshot of the authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    credentials: Option<Credentials>,
    is_loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self { credentials: None, is_loading: true }
    }
}

impl Session {
    /// Start-of-process state: signed out, still loading.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff user, access token and refresh token are all present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// True until the first restore from storage has finished.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.credentials.as_ref().map(|c| &c.user)
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.access_token.as_str())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.refresh_token.as_str())
    }
}

/// Result of a session transition, consumed by whoever owns the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsChanged {
    SignedIn { access_token: String },
    SignedOut,
}

impl CredentialsChanged {
    fn from_session(session: &Session) -> Self {
        match session.access_token() {
            Some(token) => Self::SignedIn { access_token: token.to_owned() },
            None => Self::SignedOut,
        }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        match self {
            Self::SignedIn { access_token } => Some(access_token),
            Self::SignedOut => None,
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore<S> {
    storage: S,
    state: watch::Sender<Session>,
    loaded: AtomicBool,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        let (state, _) = watch::channel(Session::new());
        Self { storage, state, loaded: AtomicBool::new(false) }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that observes every session transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Persist a full credential set, then make it the current session.
    ///
    /// # Errors
    ///
    /// Returns the storage error if any value could not be written. The
    /// in-memory session is left unchanged in that case.
    pub async fn set_auth(
        &self,
        user: User,
        access_token: String,
        refresh_token: String,
    ) -> Result<CredentialsChanged, StorageError> {
        let credentials = Credentials { user, access_token, refresh_token };
        if let Err(e) = self.persist(&credentials).await {
            tracing::warn!(error = %e, "session persist failed; keeping previous session");
            let previous = self.state.borrow().credentials.clone();
            self.rollback(previous.as_ref()).await;
            return Err(e);
        }

        let event = CredentialsChanged::SignedIn { access_token: credentials.access_token.clone() };
        let user_id = credentials.user.id.clone();
        self.state.send_modify(|s| s.credentials = Some(credentials));
        tracing::info!(%user_id, "session signed in");
        Ok(event)
    }

    /// Remove persisted credentials (best effort) and sign out in memory.
    pub async fn clear_auth(&self) -> CredentialsChanged {
        if let Err(e) = self.storage.multi_remove(&SESSION_KEYS).await {
            tracing::warn!(error = %e, "session storage clear failed; signing out anyway");
        }
        self.state.send_modify(|s| s.credentials = None);
        tracing::info!("session signed out");
        CredentialsChanged::SignedOut
    }

    /// Restore persisted credentials. Runs once per store; later calls return
    /// the current state without touching storage.
    pub async fn load_auth(&self) -> CredentialsChanged {
        if self.loaded.swap(true, Ordering::SeqCst) {
            tracing::debug!("session already loaded");
            return CredentialsChanged::from_session(&self.state.borrow());
        }

        let restored = match self.read_persisted().await {
            Ok(restored) => restored,
            Err(e) => {
                tracing::warn!(error = %e, "session restore failed; starting signed out");
                None
            }
        };

        match &restored {
            Some(c) => tracing::info!(user_id = %c.user.id, "session restored"),
            None => tracing::debug!("no persisted session"),
        }

        self.state.send_modify(|s| {
            if restored.is_some() {
                s.credentials = restored;
            }
            s.is_loading = false;
        });
        CredentialsChanged::from_session(&self.state.borrow())
    }

    async fn persist(&self, credentials: &Credentials) -> Result<(), StorageError> {
        let user = serde_json::to_string(&credentials.user).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.storage.set_item(KEY_USER, &user).await?;
        self.storage.set_item(KEY_ACCESS_TOKEN, &credentials.access_token).await?;
        self.storage.set_item(KEY_REFRESH_TOKEN, &credentials.refresh_token).await?;
        Ok(())
    }

    /// After a failed write, put storage back in line with memory so a restart
    /// never restores a mix of old and new values.
    async fn rollback(&self, previous: Option<&Credentials>) {
        let result = match previous {
            Some(previous) => self.persist(previous).await,
            None => self.storage.multi_remove(&SESSION_KEYS).await,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "session rollback failed");
        }
    }

    async fn read_persisted(&self) -> Result<Option<Credentials>, StorageError> {
        let mut values: HashMap<String, Option<String>> =
            self.storage.multi_get(&SESSION_KEYS).await?.into_iter().collect();
        let mut take = |key: &str| values.remove(key).flatten();

        let user = match take(KEY_USER).filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(serde_json::from_str::<User>(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))?),
            None => None,
        };
        Ok(Credentials::from_parts(user, take(KEY_ACCESS_TOKEN), take(KEY_REFRESH_TOKEN)))
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
