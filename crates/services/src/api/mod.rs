mod client;
mod http;
mod memory;
mod wire;

use async_trait::async_trait;
use quiz_core::model::{Assessment, AssessmentId, Question, QuestionId, QuizResult, SubmissionDraft};

use crate::error::ApiError;

pub use client::ApiClient;
pub use http::HttpAssessmentApi;
pub use memory::{InMemoryAssessmentApi, SubmitReply};

/// Backend contract consumed by the quiz core.
#[async_trait]
pub trait AssessmentApi: Send + Sync {
    /// `GET /assessments/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or decoding failures.
    async fn fetch_assessment(&self, id: &AssessmentId) -> Result<Assessment, ApiError>;

    /// `POST /questions/bulk`. Order of the returned list is not guaranteed.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or decoding failures.
    async fn fetch_questions(&self, ids: &[QuestionId]) -> Result<Vec<Question>, ApiError>;

    /// `POST /assessments/{id}/submit`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or decoding failures.
    async fn submit_attempt(
        &self,
        id: &AssessmentId,
        draft: &SubmissionDraft,
    ) -> Result<QuizResult, ApiError>;
}
