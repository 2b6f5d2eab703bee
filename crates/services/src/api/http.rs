use std::collections::HashSet;

use async_trait::async_trait;

use quiz_core::model::{Assessment, AssessmentId, Question, QuestionId, QuizResult, SubmissionDraft};

use super::wire::{
    AssessmentEnvelope, BulkQuestionsRequest, QuestionsResponse, SubmitRequest, SubmitResponse,
};
use super::{ApiClient, AssessmentApi};
use crate::error::ApiError;

/// `AssessmentApi` backed by the REST gateway.
#[derive(Clone)]
pub struct HttpAssessmentApi {
    client: ApiClient,
}

impl HttpAssessmentApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssessmentApi for HttpAssessmentApi {
    async fn fetch_assessment(&self, id: &AssessmentId) -> Result<Assessment, ApiError> {
        let envelope: AssessmentEnvelope = self
            .client
            .get_json(&format!("assessments/{id}"))
            .await?;
        envelope.assessment.into_model()
    }

    async fn fetch_questions(&self, ids: &[QuestionId]) -> Result<Vec<Question>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let response: QuestionsResponse = self
            .client
            .post_json("questions/bulk", &BulkQuestionsRequest { question_ids: ids })
            .await?;

        let mut seen = HashSet::new();
        let mut questions = Vec::new();
        for dto in response.into_vec() {
            let question = dto.into_model()?;
            if seen.insert(question.id().clone()) {
                questions.push(question);
            }
        }
        Ok(questions)
    }

    async fn submit_attempt(
        &self,
        id: &AssessmentId,
        draft: &SubmissionDraft,
    ) -> Result<QuizResult, ApiError> {
        let response: SubmitResponse = self
            .client
            .post_json(&format!("assessments/{id}/submit"), &SubmitRequest::from(draft))
            .await?;
        let result = response.result.into_model();
        tracing::info!(assessment_id = %id, score = result.score, passed = result.passed, "attempt graded");
        Ok(result)
    }
}
