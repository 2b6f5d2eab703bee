use quiz_core::model::Destination;

/// Which step of the session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Load,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizFailure {
    pub stage: FailureStage,
    pub message: String,
}

impl QuizFailure {
    #[must_use]
    pub fn new(stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    /// A failed submit can be retried without reloading.
    #[must_use]
    pub fn can_retry_submit(&self) -> bool {
        self.stage == FailureStage::Submit
    }
}

/// Observable lifecycle of a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuizPhase {
    #[default]
    Idle,
    Loading,
    InProgress,
    Submitting,
    Completed(Destination),
    Failed(QuizFailure),
}

/// What views render on every publish, including each countdown tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizSnapshot {
    pub phase: QuizPhase,
    pub current_index: usize,
    pub question_count: usize,
    pub remaining_secs: u32,
    pub answered_count: usize,
}

impl QuizSnapshot {
    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.question_count.saturating_sub(self.answered_count)
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.question_count
    }
}
