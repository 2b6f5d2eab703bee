//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AssessmentError, AttemptError, QuestionError, QuestionId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the API gateway client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("session expired, please sign in again")]
    Unauthorized,
    #[error("request failed with status {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<QuestionError> for ApiError {
    fn from(err: QuestionError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Errors emitted while loading or driving a quiz session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("question {0} was not returned by the server")]
    MissingQuestion(QuestionId),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error("quiz session already loaded")]
    AlreadyLoaded,
    #[error("quiz session was disposed")]
    Disposed,
}

impl QuizError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, QuizError::Api(err) if err.is_unauthorized())
    }
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("server did not return a token")]
    EmptyToken,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
