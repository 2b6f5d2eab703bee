use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::scoring::answers_match;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have at least one option")]
    NoOptions,
}

/// A multiple-choice question. Read-only during an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    tags: Vec<String>,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank or there are no options.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        Ok(Self {
            id,
            prompt,
            options,
            correct_answer: correct_answer.into(),
            tags,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Exact membership test against the declared options.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }

    /// Case-insensitive correctness check.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answers_match(answer, &self.correct_answer)
    }
}
