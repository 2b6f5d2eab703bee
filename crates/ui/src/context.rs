use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use quiz_core::model::{AssessmentId, CourseId};
use services::{AuthService, QuizService, UnauthorizedHook};

use crate::vm::CompletedQuiz;

/// Raised from any thread when the backend rejects the token.
#[derive(Clone, Default)]
pub struct SessionExpiry {
    expired: Arc<AtomicBool>,
}

impl SessionExpiry {
    /// Hook for `AuthSession`; only flips the flag so views can react on render.
    #[must_use]
    pub fn hook(&self) -> UnauthorizedHook {
        let expired = Arc::clone(&self.expired);
        Arc::new(move || expired.store(true, Ordering::Release))
    }

    /// One-shot read: returns `true` once per expiry.
    #[must_use]
    pub fn take(&self) -> bool {
        self.expired.swap(false, Ordering::AcqRel)
    }
}

pub trait UiApp: Send + Sync {
    fn quiz(&self) -> QuizService;
    fn auth(&self) -> AuthService;
    fn session_expiry(&self) -> SessionExpiry;

    /// Assessment to open on launch, if one was given on the command line.
    fn initial_assessment(&self) -> Option<AssessmentId>;
}

#[derive(Clone)]
pub struct AppContext {
    quiz: QuizService,
    auth: AuthService,
    expiry: SessionExpiry,
    initial_assessment: Option<AssessmentId>,
    completed: Arc<Mutex<Option<CompletedQuiz>>>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            quiz: app.quiz(),
            auth: app.auth(),
            expiry: app.session_expiry(),
            initial_assessment: app.initial_assessment(),
            completed: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn quiz(&self) -> QuizService {
        self.quiz.clone()
    }

    #[must_use]
    pub fn auth(&self) -> AuthService {
        self.auth.clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.auth.session().is_signed_in()
    }

    #[must_use]
    pub fn take_session_expired(&self) -> bool {
        self.expiry.take()
    }

    #[must_use]
    pub fn initial_assessment(&self) -> Option<AssessmentId> {
        self.initial_assessment.clone()
    }

    /// Keep the latest graded attempt for the results and advice pages.
    pub fn record_completion(&self, done: CompletedQuiz) {
        *self.completed.lock().unwrap_or_else(PoisonError::into_inner) = Some(done);
    }

    #[must_use]
    pub fn completion_for_assessment(&self, id: &AssessmentId) -> Option<CompletedQuiz> {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|done| &done.assessment_id == id)
            .cloned()
    }

    #[must_use]
    pub fn completion_for_course(&self, id: &CourseId) -> Option<CompletedQuiz> {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|done| &done.course_id == id)
            .cloned()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
