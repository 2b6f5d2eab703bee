//! Quiz session orchestration: load, countdown, answer, submit.

mod confirm;
mod loader;
mod phase;
mod service;
mod session;
mod timer;

pub use confirm::{AlwaysConfirm, SubmitConfirmation};
pub use loader::load_attempt;
pub use phase::{FailureStage, QuizFailure, QuizPhase, QuizSnapshot};
pub use service::QuizService;
pub use session::{QuizSession, SubmissionReceipt, SubmitOutcome};
