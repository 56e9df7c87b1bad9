//! Composition layer: session store, request pipeline and services wired together.
//!
//! ARCHITECTURE
//! ============
//! The session store and the pipeline never reference each other. Every
//! session transition returns a [`CredentialsChanged`], and [`Storefront`]
//! forwards it to [`ApiClient::set_access_token`]. This is the only place
//! the pipeline token is written, so it always matches the session.
//!
//! A token from a fresh login is forwarded only after the credentials were
//! persisted. If persistence fails the caller gets a `STORAGE_ERROR` and
//! the previous session, token included, stays in effect.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::{ApiClient, ApiError, Failure, normalize};
use crate::config::ApiConfig;
use crate::services::Services;
use crate::session::{CredentialsChanged, Session, SessionStore};
use crate::storage::KeyValueStore;
use crate::types::{AuthResponse, User};

pub type SharedStore = Arc<dyn KeyValueStore>;

pub struct Storefront {
    api: ApiClient,
    session: SessionStore<SharedStore>,
    services: Services,
}

impl Storefront {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, storage: SharedStore) -> Result<Self, ApiError> {
        Ok(Self::with_client(ApiClient::new(config)?, storage))
    }

    #[must_use]
    pub fn with_client(api: ApiClient, storage: SharedStore) -> Self {
        let services = Services::new(&api);
        Self { api, session: SessionStore::new(storage), services }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Restore the persisted session and arm the pipeline with its token.
    pub async fn bootstrap(&self) -> Session {
        let event = self.session.load_auth().await;
        self.apply(&event);
        self.session.snapshot()
    }

    /// # Errors
    ///
    /// Returns the server error, or `STORAGE_ERROR` if the new session could
    /// not be saved.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let resp = self.services.auth.register(email, password).await?;
        self.adopt(resp).await
    }

    /// # Errors
    ///
    /// Returns the server error, or `STORAGE_ERROR` if the new session could
    /// not be saved.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let resp = self.services.auth.login(email, password).await?;
        self.adopt(resp).await
    }

    /// Sign out locally. The server-side revoke is best effort.
    pub async fn logout(&self) {
        if let Some(credentials) = self.session.snapshot().credentials() {
            if let Err(e) = self.services.auth.logout(&credentials.user.id, &credentials.refresh_token).await {
                tracing::warn!(error = %e, "server logout failed; clearing local session");
            }
        }
        let event = self.session.clear_auth().await;
        self.apply(&event);
    }

    /// Exchange the refresh token for a new pair. A refresh token the server
    /// refuses (401/403 or a `success: false` envelope) ends the session.
    ///
    /// # Errors
    ///
    /// `401` when not signed in; otherwise the refresh or storage error.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let Some(credentials) = self.session.snapshot().credentials().cloned() else {
            return Err(ApiError::new("You are not signed in").with_code("401"));
        };

        match self.services.auth.refresh(&credentials.refresh_token).await {
            Ok(pair) => self.store(credentials.user, pair.access_token, pair.refresh_token).await,
            Err(e) if e.is_unauthorized() || e.is_rejected() => {
                tracing::info!(user_id = %credentials.user.id, "refresh rejected; signing out");
                let event = self.session.clear_auth().await;
                self.apply(&event);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn adopt(&self, resp: AuthResponse) -> Result<User, ApiError> {
        let user = resp.user.clone();
        self.store(resp.user, resp.access_token, resp.refresh_token).await?;
        Ok(user)
    }

    async fn store(&self, user: User, access_token: String, refresh_token: String) -> Result<(), ApiError> {
        let event = self.session.set_auth(user, access_token, refresh_token).await;
        let event = event.map_err(|e| normalize(Failure::Persistence(e.to_string())))?;
        self.apply(&event);
        Ok(())
    }

    fn apply(&self, event: &CredentialsChanged) {
        self.api.set_access_token(event.access_token().map(str::to_owned));
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
