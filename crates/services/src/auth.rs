use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use storage::repository::{StorageError, TokenStore};

use crate::Clock;
use crate::api::ApiClient;
use crate::error::AuthError;

/// Invoked after a 401 has cleared the token, so the caller can route to login.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Explicit auth context threaded through the HTTP client.
///
/// Holds the bearer token in memory, mirrors it to a `TokenStore`, and
/// reports expiry through `on_unauthorized` instead of redirecting itself.
pub struct AuthSession {
    clock: Clock,
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<String>>,
    on_unauthorized: UnauthorizedHook,
}

impl AuthSession {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn TokenStore>, on_unauthorized: UnauthorizedHook) -> Self {
        Self {
            clock,
            store,
            token: RwLock::new(None),
            on_unauthorized,
        }
    }

    /// Load a previously saved token into memory.
    ///
    /// Returns whether a token was found.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token store cannot be read.
    pub async fn restore(&self) -> Result<bool, StorageError> {
        let stored = self.store.load_token().await?;
        let found = stored.is_some();
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = stored.map(|s| s.token);
        tracing::debug!(found, "restored auth session");
        Ok(found)
    }

    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.bearer().is_some()
    }

    /// Persist and cache a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be saved; the cached token is
    /// left untouched in that case.
    pub async fn sign_in(&self, token: &str) -> Result<(), StorageError> {
        self.store.save_token(token, self.clock.now()).await?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the stored token cannot be removed. The
    /// in-memory token is cleared regardless.
    pub async fn sign_out(&self) -> Result<(), StorageError> {
        self.forget();
        self.store.clear_token().await
    }

    /// Drop the token everywhere and notify the hook.
    pub async fn handle_unauthorized(&self) {
        tracing::warn!("backend rejected the bearer token; clearing session");
        if let Err(err) = self.sign_out().await {
            tracing::error!(error = %err, "failed to clear stored token after 401");
        }
        (self.on_unauthorized)();
    }

    fn forget(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("signed_in", &self.is_signed_in())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Signs the learner in and out against the backend.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    session: Arc<AuthSession>,
}

impl AuthService {
    #[must_use]
    pub fn new(client: ApiClient, session: Arc<AuthSession>) -> Self {
        Self { client, session }
    }

    #[must_use]
    pub fn session(&self) -> Arc<AuthSession> {
        Arc::clone(&self.session)
    }

    /// Exchange credentials for a bearer token and store it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` for blank credentials, request failures, an empty
    /// token, or storage failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let response: LoginResponse = self
            .client
            .post_json("auth/login", &LoginRequest { email, password })
            .await?;
        if response.token.trim().is_empty() {
            return Err(AuthError::EmptyToken);
        }

        self.session.sign_in(&response.token).await?;
        tracing::info!("signed in");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored token cannot be cleared.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.session.sign_out().await?;
        tracing::info!("signed out");
        Ok(())
    }
}
