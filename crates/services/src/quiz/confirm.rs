use async_trait::async_trait;

/// Asks the learner whether to submit with unanswered questions.
///
/// The countdown is frozen while this is pending.
#[async_trait]
pub trait SubmitConfirmation: Send + Sync {
    async fn confirm_unanswered(&self, unanswered: usize) -> bool;
}

/// Confirms everything. Used for timeout submissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl SubmitConfirmation for AlwaysConfirm {
    async fn confirm_unanswered(&self, _unanswered: usize) -> bool {
        true
    }
}
