use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;

use quiz_core::Clock;
use quiz_core::model::{
    AssessmentId, Attempt, AttemptStatus, Destination, QuestionId, QuizResult, SubmitTrigger,
    TickOutcome,
};
use quiz_core::scoring::Tally;

use super::confirm::{AlwaysConfirm, SubmitConfirmation};
use super::loader::load_attempt;
use super::phase::{FailureStage, QuizFailure, QuizPhase, QuizSnapshot};
use super::timer::Countdown;
use crate::api::AssessmentApi;
use crate::error::QuizError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Everything the result screens need after a graded submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub result: QuizResult,
    pub destination: Destination,
    /// Client-side tally for the review screen.
    pub tally: Tally,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another submission owns the attempt, or the session is gone.
    Ignored,
    /// The learner declined to submit with unanswered questions.
    Cancelled,
    Submitted(SubmissionReceipt),
    Failed { message: String, unauthorized: bool },
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

enum SessionState {
    Idle,
    Loading,
    Active(Attempt),
    LoadFailed(QuizFailure),
    Disposed,
}

impl SessionState {
    fn snapshot(&self) -> QuizSnapshot {
        match self {
            SessionState::Idle | SessionState::Disposed => QuizSnapshot::default(),
            SessionState::Loading => QuizSnapshot {
                phase: QuizPhase::Loading,
                ..QuizSnapshot::default()
            },
            SessionState::LoadFailed(failure) => QuizSnapshot {
                phase: QuizPhase::Failed(failure.clone()),
                ..QuizSnapshot::default()
            },
            SessionState::Active(attempt) => {
                let phase = match attempt.status() {
                    AttemptStatus::InProgress => QuizPhase::InProgress,
                    AttemptStatus::Submitting(_) => QuizPhase::Submitting,
                    AttemptStatus::Completed(result) => QuizPhase::Completed(
                        result.destination(attempt.assessment_id(), attempt.course_id()),
                    ),
                    AttemptStatus::Failed(reason) => {
                        QuizPhase::Failed(QuizFailure::new(FailureStage::Submit, reason.clone()))
                    }
                };
                QuizSnapshot {
                    phase,
                    current_index: attempt.current_index(),
                    question_count: attempt.question_count(),
                    remaining_secs: attempt.remaining_secs(),
                    answered_count: attempt.answered_count(),
                }
            }
        }
    }
}

struct Inner {
    api: Arc<dyn AssessmentApi>,
    clock: Clock,
    state: Mutex<SessionState>,
    snapshots: watch::Sender<QuizSnapshot>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called with the state lock held so snapshots are published in order.
    fn publish(&self, state: &SessionState) {
        self.snapshots.send_replace(state.snapshot());
    }

    /// Run one attempt mutation under the lock and publish when it changed
    /// something.
    fn mutate(&self, f: impl FnOnce(&mut Attempt) -> bool) -> bool {
        let mut state = self.lock();
        let SessionState::Active(attempt) = &mut *state else {
            return false;
        };
        let changed = f(attempt);
        if changed {
            self.publish(&state);
        }
        changed
    }

    async fn submit(&self, trigger: SubmitTrigger, confirm: &dyn SubmitConfirmation) -> SubmitOutcome {
        // Claiming the submission is the double-submit guard.
        let unanswered = {
            let mut state = self.lock();
            let SessionState::Active(attempt) = &mut *state else {
                return SubmitOutcome::Ignored;
            };
            if let Err(err) = attempt.begin_submit(trigger) {
                tracing::debug!(error = %err, ?trigger, "submit ignored");
                return SubmitOutcome::Ignored;
            }
            let unanswered = attempt
                .requires_confirmation(trigger)
                .then(|| attempt.unanswered_count());
            self.publish(&state);
            unanswered
        };

        if let Some(unanswered) = unanswered {
            if !confirm.confirm_unanswered(unanswered).await {
                let mut state = self.lock();
                if let SessionState::Active(attempt) = &mut *state {
                    if let Err(err) = attempt.cancel_submit() {
                        tracing::warn!(error = %err, "could not resume attempt after decline");
                    }
                    self.publish(&state);
                }
                return SubmitOutcome::Cancelled;
            }
        }

        let (assessment_id, course_id, draft, tally) = {
            let state = self.lock();
            let SessionState::Active(attempt) = &*state else {
                return SubmitOutcome::Ignored;
            };
            (
                attempt.assessment_id().clone(),
                attempt.course_id().clone(),
                attempt.submission(self.clock.now()),
                attempt.local_tally(),
            )
        };

        tracing::info!(
            assessment_id = %assessment_id,
            ?trigger,
            answered = tally.total - draft.answers.iter().filter(|a| a.is_none()).count(),
            total = tally.total,
            "submitting attempt"
        );
        let response = self.api.submit_attempt(&assessment_id, &draft).await;

        let mut state = self.lock();
        let SessionState::Active(attempt) = &mut *state else {
            tracing::debug!(assessment_id = %assessment_id, "session disposed; dropping submit response");
            return SubmitOutcome::Ignored;
        };
        let outcome = match response {
            Ok(result) => {
                let destination = result.destination(&assessment_id, &course_id);
                if let Err(err) = attempt.complete(result.clone()) {
                    tracing::warn!(error = %err, "attempt left submitting state early");
                }
                SubmitOutcome::Submitted(SubmissionReceipt {
                    result,
                    destination,
                    tally,
                })
            }
            Err(err) => {
                tracing::error!(assessment_id = %assessment_id, error = %err, "submission failed");
                let message = err.to_string();
                if let Err(err) = attempt.fail(message.clone()) {
                    tracing::warn!(error = %err, "attempt left submitting state early");
                }
                SubmitOutcome::Failed {
                    message,
                    unauthorized: err.is_unauthorized(),
                }
            }
        };
        self.publish(&state);
        outcome
    }
}

/// Countdown callback. Holds only a weak reference so a dropped session ends it.
fn on_tick(weak: &Weak<Inner>) -> ControlFlow<()> {
    let Some(inner) = weak.upgrade() else {
        return ControlFlow::Break(());
    };
    {
        let mut state = inner.lock();
        let SessionState::Active(attempt) = &mut *state else {
            return ControlFlow::Break(());
        };
        match attempt.tick() {
            TickOutcome::Ticked { .. } => {
                inner.publish(&state);
                return ControlFlow::Continue(());
            }
            TickOutcome::Frozen => {
                return if matches!(attempt.status(), AttemptStatus::Completed(_)) {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                };
            }
            TickOutcome::Expired => inner.publish(&state),
        }
    }

    tracing::info!("time is up; submitting attempt");
    tokio::spawn(async move {
        inner.submit(SubmitTrigger::Timeout, &AlwaysConfirm).await;
    });
    ControlFlow::Break(())
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Controller for one learner's attempt at one assessment.
///
/// Dropping the session (or calling [`QuizSession::dispose`]) stops the
/// countdown; responses that arrive afterwards are ignored.
pub struct QuizSession {
    assessment_id: AssessmentId,
    tick_period: Duration,
    inner: Arc<Inner>,
    timer: Mutex<Option<Countdown>>,
}

impl QuizSession {
    #[must_use]
    pub fn new(
        api: Arc<dyn AssessmentApi>,
        clock: Clock,
        assessment_id: AssessmentId,
        tick_period: Duration,
    ) -> Self {
        let (snapshots, _) = watch::channel(QuizSnapshot::default());
        Self {
            assessment_id,
            tick_period,
            inner: Arc::new(Inner {
                api,
                clock,
                state: Mutex::new(SessionState::Idle),
                snapshots,
            }),
            timer: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn assessment_id(&self) -> &AssessmentId {
        &self.assessment_id
    }

    /// Fetch the assessment and start the countdown.
    ///
    /// A failed load may be retried by calling `load` again.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyLoaded` if loading is underway or done,
    /// `QuizError::Disposed` after disposal, or the load failure itself.
    pub async fn load(&self) -> Result<(), QuizError> {
        {
            let mut state = self.inner.lock();
            match &*state {
                SessionState::Idle | SessionState::LoadFailed(_) => {}
                SessionState::Disposed => return Err(QuizError::Disposed),
                SessionState::Loading | SessionState::Active(_) => {
                    return Err(QuizError::AlreadyLoaded);
                }
            }
            *state = SessionState::Loading;
            self.inner.publish(&state);
        }

        tracing::info!(assessment_id = %self.assessment_id, "loading assessment");
        let loaded = load_attempt(self.inner.api.as_ref(), &self.assessment_id).await;

        {
            let mut state = self.inner.lock();
            if matches!(*state, SessionState::Disposed) {
                return Err(QuizError::Disposed);
            }
            match loaded {
                Ok(attempt) => {
                    *state = SessionState::Active(attempt);
                    self.inner.publish(&state);
                }
                Err(err) => {
                    tracing::error!(assessment_id = %self.assessment_id, error = %err, "failed to load assessment");
                    *state = SessionState::LoadFailed(QuizFailure::new(
                        FailureStage::Load,
                        err.to_string(),
                    ));
                    self.inner.publish(&state);
                    return Err(err);
                }
            }
        }

        self.start_timer();
        Ok(())
    }

    fn start_timer(&self) {
        let weak = Arc::downgrade(&self.inner);
        let countdown = Countdown::spawn(self.tick_period, move || on_tick(&weak));
        *self.timer.lock().unwrap_or_else(PoisonError::into_inner) = Some(countdown);
    }

    fn stop_timer(&self) {
        if let Some(countdown) = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            countdown.stop();
        }
    }

    /// Receiver that observes every state change and countdown tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuizSnapshot> {
        self.inner.snapshots.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Read the live attempt, if one is loaded.
    pub fn with_attempt<R>(&self, f: impl FnOnce(&Attempt) -> R) -> Option<R> {
        match &*self.inner.lock() {
            SessionState::Active(attempt) => Some(f(attempt)),
            _ => None,
        }
    }

    pub fn select_answer(&self, question_id: &QuestionId, option: &str) -> bool {
        self.inner
            .mutate(|attempt| attempt.select_answer(question_id, option))
    }

    pub fn go_to_next(&self) -> bool {
        self.inner.mutate(Attempt::go_to_next)
    }

    pub fn go_to_previous(&self) -> bool {
        self.inner.mutate(Attempt::go_to_previous)
    }

    pub fn jump_to(&self, index: usize) -> bool {
        self.inner.mutate(|attempt| attempt.jump_to(index))
    }

    /// Learner-initiated submit.
    ///
    /// `confirm` is consulted only when questions are unanswered and time is
    /// left. Concurrent calls yield one submission; the rest are `Ignored`.
    pub async fn submit(&self, confirm: &dyn SubmitConfirmation) -> SubmitOutcome {
        self.inner.submit(SubmitTrigger::Manual, confirm).await
    }

    /// Resubmit after a failed submission. Ignored in any other state.
    pub async fn retry_submit(&self) -> SubmitOutcome {
        self.inner.submit(SubmitTrigger::Retry, &AlwaysConfirm).await
    }

    /// Stop the countdown and drop the attempt.
    pub fn dispose(&self) {
        self.stop_timer();
        let mut state = self.inner.lock();
        if !matches!(*state, SessionState::Disposed) {
            tracing::debug!(assessment_id = %self.assessment_id, "quiz session disposed");
            *state = SessionState::Disposed;
        }
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSession")
            .field("assessment_id", &self.assessment_id)
            .field("phase", &self.snapshot().phase)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
