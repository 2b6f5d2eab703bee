use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use services::SubmitConfirmation;
use tokio::sync::{Notify, oneshot};

struct PendingConfirm {
    unanswered: usize,
    reply: oneshot::Sender<bool>,
}

/// Hands the session's "submit with unanswered questions?" prompt to a modal.
///
/// The session awaits [`SubmitConfirmation::confirm_unanswered`]; the view
/// waits on [`ConfirmBridge::requested`], shows the dialog, and calls
/// [`ConfirmBridge::answer`]. Dropping the bridge declines.
#[derive(Clone, Default)]
pub struct ConfirmBridge {
    pending: Arc<Mutex<Option<PendingConfirm>>>,
    requested: Arc<Notify>,
}

impl ConfirmBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unanswered count of the open prompt, if any.
    #[must_use]
    pub fn pending_unanswered(&self) -> Option<usize> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|pending| pending.unanswered)
    }

    /// Resolve the open prompt. Returns `false` when nothing was pending.
    pub fn answer(&self, submit: bool) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pending {
            Some(pending) => pending.reply.send(submit).is_ok(),
            None => false,
        }
    }

    /// Resolves once a prompt has been opened.
    pub async fn requested(&self) {
        self.requested.notified().await;
    }
}

#[async_trait]
impl SubmitConfirmation for ConfirmBridge {
    async fn confirm_unanswered(&self, unanswered: usize) -> bool {
        let (reply, response) = oneshot::channel();
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(PendingConfirm { unanswered, reply });
        self.requested.notify_one();
        response.await.unwrap_or(false)
    }
}
