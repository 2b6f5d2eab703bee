use std::sync::Arc;
use std::time::Duration;

use quiz_core::Clock;
use quiz_core::model::AssessmentId;

use super::session::QuizSession;
use crate::api::AssessmentApi;
use crate::error::QuizError;

const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Creates quiz sessions against one backend.
#[derive(Clone)]
pub struct QuizService {
    api: Arc<dyn AssessmentApi>,
    clock: Clock,
}

impl QuizService {
    #[must_use]
    pub fn new(api: Arc<dyn AssessmentApi>, clock: Clock) -> Self {
        Self { api, clock }
    }

    /// An idle session; call [`QuizSession::load`] to start it.
    #[must_use]
    pub fn session(&self, assessment_id: AssessmentId) -> QuizSession {
        QuizSession::new(
            Arc::clone(&self.api),
            self.clock,
            assessment_id,
            DEFAULT_TICK,
        )
    }

    /// Create and load a session in one step.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the assessment cannot be loaded.
    pub async fn start(&self, assessment_id: AssessmentId) -> Result<QuizSession, QuizError> {
        let session = self.session(assessment_id);
        session.load().await?;
        Ok(session)
    }
}
