use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;

use quiz_core::model::{
    Assessment, AssessmentId, PASS_THRESHOLD, Question, QuestionId, QuizResult, ResultId,
    SubmissionDraft,
};
use quiz_core::scoring::answers_match;

use super::AssessmentApi;
use crate::error::ApiError;

/// Scripted reply for the next submission.
#[derive(Debug, Clone)]
pub enum SubmitReply {
    Graded(QuizResult),
    Rejected { status: StatusCode, message: String },
    Unauthorized,
}

#[derive(Default)]
struct MemoryState {
    assessments: HashMap<AssessmentId, Assessment>,
    questions: BTreeMap<QuestionId, Question>,
    replies: VecDeque<SubmitReply>,
    submissions: Vec<(AssessmentId, SubmissionDraft)>,
    hold: Option<Arc<Notify>>,
}

/// In-process backend for tests and offline demos.
///
/// Questions come back sorted by id, not in the requested order. Without a
/// scripted reply, submissions are graded locally.
#[derive(Clone, Default)]
pub struct InMemoryAssessmentApi {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryAssessmentApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_assessment(&self, assessment: Assessment) {
        self.lock()
            .assessments
            .insert(assessment.id().clone(), assessment);
    }

    pub fn insert_question(&self, question: Question) {
        self.lock().questions.insert(question.id().clone(), question);
    }

    pub fn push_reply(&self, reply: SubmitReply) {
        self.lock().replies.push_back(reply);
    }

    /// Make every following submission wait until the returned `Notify` fires.
    #[must_use]
    pub fn hold_submissions(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.lock().hold = Some(Arc::clone(&notify));
        notify
    }

    #[must_use]
    pub fn submit_calls(&self) -> usize {
        self.lock().submissions.len()
    }

    #[must_use]
    pub fn submissions(&self) -> Vec<(AssessmentId, SubmissionDraft)> {
        self.lock().submissions.clone()
    }

    fn grade(&self, draft: &SubmissionDraft) -> QuizResult {
        let state = self.lock();
        let total = draft.question_ids.len();
        let mut correct = 0usize;
        let mut gaps: Vec<String> = Vec::new();
        for (id, answer) in draft.question_ids.iter().zip(&draft.answers) {
            let Some(question) = state.questions.get(id) else {
                continue;
            };
            let right = answer
                .as_deref()
                .is_some_and(|a| answers_match(a, question.correct_answer()));
            if right {
                correct += 1;
            } else {
                for tag in question.tags() {
                    if !gaps.contains(tag) {
                        gaps.push(tag.clone());
                    }
                }
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let score = if total == 0 {
            0.0
        } else {
            correct as f64 * 100.0 / total as f64
        };
        QuizResult::new(
            ResultId::new(format!("result-{}", state.submissions.len())),
            score,
            score >= PASS_THRESHOLD,
            gaps,
        )
    }
}

#[async_trait]
impl AssessmentApi for InMemoryAssessmentApi {
    async fn fetch_assessment(&self, id: &AssessmentId) -> Result<Assessment, ApiError> {
        self.lock()
            .assessments
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::HttpStatus {
                status: StatusCode::NOT_FOUND,
                message: "Assessment not found".into(),
            })
    }

    async fn fetch_questions(&self, ids: &[QuestionId]) -> Result<Vec<Question>, ApiError> {
        let state = self.lock();
        Ok(state
            .questions
            .values()
            .filter(|q| ids.contains(q.id()))
            .cloned()
            .collect())
    }

    async fn submit_attempt(
        &self,
        id: &AssessmentId,
        draft: &SubmissionDraft,
    ) -> Result<QuizResult, ApiError> {
        let (hold, reply) = {
            let mut state = self.lock();
            state.submissions.push((id.clone(), draft.clone()));
            (state.hold.clone(), state.replies.pop_front())
        };
        if let Some(notify) = hold {
            notify.notified().await;
        }
        match reply {
            Some(SubmitReply::Graded(result)) => Ok(result),
            Some(SubmitReply::Rejected { status, message }) => {
                Err(ApiError::HttpStatus { status, message })
            }
            Some(SubmitReply::Unauthorized) => Err(ApiError::Unauthorized),
            None => Ok(self.grade(draft)),
        }
    }
}
