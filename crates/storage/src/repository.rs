use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Bearer token as persisted between runs.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("token", &"<redacted>")
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

/// Persistence for the single bearer token of the signed-in learner.
///
/// The token is always written and cleared as a whole value.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the current token, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn load_token(&self) -> Result<Option<StoredToken>, StorageError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a blank token, or other storage errors.
    async fn save_token(&self, token: &str, saved_at: DateTime<Utc>) -> Result<(), StorageError>;

    /// Remove the stored token. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    async fn clear_token(&self) -> Result<(), StorageError>;
}

/// Simple in-memory token store for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    token: Arc<Mutex<Option<StoredToken>>>,
}

impl InMemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load_token(&self) -> Result<Option<StoredToken>, StorageError> {
        let guard = self
            .token
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_token(&self, token: &str, saved_at: DateTime<Utc>) -> Result<(), StorageError> {
        if token.trim().is_empty() {
            return Err(StorageError::Serialization("empty token".into()));
        }
        let mut guard = self
            .token
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(StoredToken {
            token: token.to_owned(),
            saved_at,
        });
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), StorageError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub tokens: Arc<dyn TokenStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
        Self { tokens }
    }
}
