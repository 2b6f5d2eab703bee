use thiserror::Error;

use crate::model::ids::{AssessmentId, CourseId, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment title cannot be empty")]
    EmptyTitle,

    #[error("time limit must be > 0 minutes")]
    InvalidTimeLimit,

    #[error("question {0} is listed more than once")]
    DuplicateQuestion(QuestionId),
}

/// A timed assessment as fetched from the backend.
///
/// Immutable once built; an attempt copies what it needs out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    id: AssessmentId,
    title: String,
    time_limit_minutes: u32,
    course_id: CourseId,
    question_ids: Vec<QuestionId>,
}

impl Assessment {
    /// Build an assessment, validating title, time limit, and question list.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError` if the title is blank, the time limit is zero,
    /// or a question id appears twice.
    pub fn new(
        id: AssessmentId,
        title: impl Into<String>,
        time_limit_minutes: u32,
        course_id: CourseId,
        question_ids: Vec<QuestionId>,
    ) -> Result<Self, AssessmentError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AssessmentError::EmptyTitle);
        }
        if time_limit_minutes == 0 {
            return Err(AssessmentError::InvalidTimeLimit);
        }
        for (idx, qid) in question_ids.iter().enumerate() {
            if question_ids[..idx].contains(qid) {
                return Err(AssessmentError::DuplicateQuestion(qid.clone()));
            }
        }

        Ok(Self {
            id,
            title,
            time_limit_minutes,
            course_id,
            question_ids,
        })
    }

    #[must_use]
    pub fn id(&self) -> &AssessmentId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    /// Time limit converted to seconds (minutes × 60).
    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_minutes.saturating_mul(60)
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    /// Question ids in presentation order.
    #[must_use]
    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }
}
