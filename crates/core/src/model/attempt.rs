use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::assessment::Assessment;
use crate::model::ids::{AssessmentId, CourseId, QuestionId};
use crate::model::question::Question;
use crate::model::result::QuizResult;
use crate::scoring::{Tally, tally};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("assessment has no questions")]
    NoQuestions,

    #[error("questions do not match the assessment question list")]
    QuestionMismatch,

    #[error("cannot move attempt from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// What started a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timeout,
    Retry,
}

/// Lifecycle of an attempt once questions are loaded.
///
/// Allowed moves: `InProgress -> Submitting`, `Submitting -> InProgress`
/// (confirmation declined), `Submitting -> Completed | Failed`, and
/// `Failed -> Submitting` (explicit retry).
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    InProgress,
    Submitting(SubmitTrigger),
    Completed(QuizResult),
    Failed(String),
}

impl AttemptStatus {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Submitting(_) => "submitting",
            AttemptStatus::Completed(_) => "completed",
            AttemptStatus::Failed(_) => "failed",
        }
    }
}

/// Result of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One second elapsed, time remains.
    Ticked { remaining_secs: u32 },
    /// Time ran out; the caller must trigger a timeout submission.
    Expired,
    /// The attempt is not running; nothing changed.
    Frozen,
}

/// Everything the backend needs to grade an attempt.
///
/// `answers[i]` is the answer for `question_ids[i]`; unanswered slots are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub answers: Vec<Option<String>>,
    pub started_at: DateTime<Utc>,
    pub question_ids: Vec<QuestionId>,
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// In-memory state of one learner's pass through an assessment.
///
/// Never persisted. The index always points at a real question.
pub struct Attempt {
    assessment_id: AssessmentId,
    course_id: CourseId,
    title: String,
    questions: Vec<Question>,
    answers: HashMap<QuestionId, String>,
    current: usize,
    time_limit_secs: u32,
    remaining_secs: u32,
    status: AttemptStatus,
}

impl Attempt {
    /// Start an attempt. `questions` must be in the assessment's presentation order.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NoQuestions` for an empty assessment and
    /// `AttemptError::QuestionMismatch` if the questions are not exactly the
    /// assessment's question list in order.
    pub fn start(assessment: &Assessment, questions: Vec<Question>) -> Result<Self, AttemptError> {
        if questions.is_empty() {
            return Err(AttemptError::NoQuestions);
        }
        let aligned = questions.len() == assessment.question_ids().len()
            && questions
                .iter()
                .zip(assessment.question_ids())
                .all(|(question, id)| question.id() == id);
        if !aligned {
            return Err(AttemptError::QuestionMismatch);
        }

        let time_limit_secs = assessment.time_limit_secs();
        Ok(Self {
            assessment_id: assessment.id().clone(),
            course_id: assessment.course_id().clone(),
            title: assessment.title().to_owned(),
            questions,
            answers: HashMap::new(),
            current: 0,
            time_limit_secs,
            remaining_secs: time_limit_secs,
            status: AttemptStatus::InProgress,
        })
    }

    #[must_use]
    pub fn assessment_id(&self) -> &AssessmentId {
        &self.assessment_id
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.time_limit_secs - self.remaining_secs
    }

    #[must_use]
    pub fn status(&self) -> &AttemptStatus {
        &self.status
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(self.status, AttemptStatus::InProgress)
    }

    #[must_use]
    pub fn answer_for(&self, question_id: &QuestionId) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, String> {
        &self.answers
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.questions.len() - self.answers.len()
    }

    // ─── Answers & navigation ──────────────────────────────────────────────

    /// Store or overwrite the chosen option for a question.
    ///
    /// Returns `false` without changing anything when the attempt is not in
    /// progress, the question is not part of this attempt, or the option is
    /// not one of the question's declared options.
    pub fn select_answer(&mut self, question_id: &QuestionId, option: &str) -> bool {
        if !self.is_in_progress() {
            return false;
        }
        let Some(question) = self.questions.iter().find(|q| q.id() == question_id) else {
            return false;
        };
        if !question.has_option(option) {
            return false;
        }
        self.answers.insert(question_id.clone(), option.to_owned());
        true
    }

    /// Returns `false` when already on the last question.
    pub fn go_to_next(&mut self) -> bool {
        self.jump_to(self.current + 1)
    }

    /// Returns `false` when already on the first question.
    pub fn go_to_previous(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(index) => self.jump_to(index),
            None => false,
        }
    }

    /// Returns `false` and leaves the index alone when `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.questions.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    // ─── Countdown ────────────────────────────────────────────────────────

    /// Advance the countdown by one second.
    ///
    /// Only an in-progress attempt counts down, so time is frozen as soon as
    /// submission begins.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_in_progress() {
            return TickOutcome::Frozen;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Ticked {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    // ─── Submission ───────────────────────────────────────────────────────

    /// Whether a submission with this trigger must be confirmed by the learner.
    ///
    /// Only manual submits with unanswered questions and time left ask.
    #[must_use]
    pub fn requires_confirmation(&self, trigger: SubmitTrigger) -> bool {
        trigger == SubmitTrigger::Manual && self.unanswered_count() > 0 && self.remaining_secs > 0
    }

    /// Claim the submission. This is the double-submit guard.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTransition` unless the attempt is in progress
    /// (or failed, for `SubmitTrigger::Retry`).
    pub fn begin_submit(&mut self, trigger: SubmitTrigger) -> Result<(), AttemptError> {
        let allowed = match (&self.status, trigger) {
            (AttemptStatus::InProgress, SubmitTrigger::Manual | SubmitTrigger::Timeout) => true,
            (AttemptStatus::Failed(_), SubmitTrigger::Retry) => true,
            _ => false,
        };
        if !allowed {
            return Err(self.invalid("submitting"));
        }
        self.status = AttemptStatus::Submitting(trigger);
        Ok(())
    }

    /// Learner declined the confirmation; resume the attempt where it was.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTransition` unless a manual submit is pending.
    pub fn cancel_submit(&mut self) -> Result<(), AttemptError> {
        if self.status != AttemptStatus::Submitting(SubmitTrigger::Manual) {
            return Err(self.invalid("in_progress"));
        }
        self.status = AttemptStatus::InProgress;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTransition` unless a submission is pending.
    pub fn complete(&mut self, result: QuizResult) -> Result<(), AttemptError> {
        if !matches!(self.status, AttemptStatus::Submitting(_)) {
            return Err(self.invalid("completed"));
        }
        self.status = AttemptStatus::Completed(result);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AttemptError::InvalidTransition` unless a submission is pending.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), AttemptError> {
        if !matches!(self.status, AttemptStatus::Submitting(_)) {
            return Err(self.invalid("failed"));
        }
        self.status = AttemptStatus::Failed(reason.into());
        Ok(())
    }

    /// Package the answers in presentation order for the backend.
    ///
    /// `started_at` is reconstructed as `now - elapsed`.
    #[must_use]
    pub fn submission(&self, now: DateTime<Utc>) -> SubmissionDraft {
        let answers = self
            .questions
            .iter()
            .map(|question| self.answers.get(question.id()).cloned())
            .collect();
        let question_ids = self.questions.iter().map(|q| q.id().clone()).collect();
        SubmissionDraft {
            answers,
            started_at: now - Duration::seconds(i64::from(self.elapsed_secs())),
            question_ids,
        }
    }

    /// Provisional client-side tally; the backend score is authoritative.
    #[must_use]
    pub fn local_tally(&self) -> Tally {
        tally(&self.questions, &self.answers)
    }

    fn invalid(&self, to: &'static str) -> AttemptError {
        AttemptError::InvalidTransition {
            from: self.status.label(),
            to,
        }
    }
}

impl fmt::Debug for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attempt")
            .field("assessment_id", &self.assessment_id)
            .field("questions_len", &self.questions.len())
            .field("answers_len", &self.answers.len())
            .field("current", &self.current)
            .field("remaining_secs", &self.remaining_secs)
            .field("status", &self.status.label())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultId;
    use crate::time::fixed_now;

    fn build(question_count: usize, minutes: u32) -> Attempt {
        let questions: Vec<Question> = (1..=question_count)
            .map(|n| {
                Question::new(
                    QuestionId::new(format!("q{n}")),
                    format!("Question {n}"),
                    vec!["Alpha".into(), "Beta".into(), "Gamma".into()],
                    "Beta",
                    Vec::new(),
                )
                .unwrap()
            })
            .collect();
        let assessment = Assessment::new(
            AssessmentId::new("a1"),
            "Quiz",
            minutes,
            CourseId::new("c1"),
            questions.iter().map(|q| q.id().clone()).collect(),
        )
        .unwrap();
        Attempt::start(&assessment, questions).unwrap()
    }

    #[test]
    fn start_rejects_empty_assessment() {
        let assessment = Assessment::new(
            AssessmentId::new("a1"),
            "Empty",
            1,
            CourseId::new("c1"),
            Vec::new(),
        )
        .unwrap();
        let err = Attempt::start(&assessment, Vec::new()).unwrap_err();
        assert_eq!(err, AttemptError::NoQuestions);
    }

    #[test]
    fn start_rejects_misordered_questions() {
        let attempt = build(2, 1);
        let mut questions = attempt.questions().to_vec();
        questions.reverse();
        let assessment = Assessment::new(
            AssessmentId::new("a1"),
            "Quiz",
            1,
            CourseId::new("c1"),
            vec![QuestionId::new("q1"), QuestionId::new("q2")],
        )
        .unwrap();
        let err = Attempt::start(&assessment, questions).unwrap_err();
        assert_eq!(err, AttemptError::QuestionMismatch);
    }

    #[test]
    fn navigation_is_clamped_to_bounds() {
        let mut attempt = build(3, 1);
        assert!(!attempt.go_to_previous());
        assert_eq!(attempt.current_index(), 0);

        assert!(attempt.go_to_next());
        assert!(attempt.go_to_next());
        assert!(!attempt.go_to_next());
        assert_eq!(attempt.current_index(), 2);

        assert!(!attempt.jump_to(3));
        assert!(!attempt.jump_to(usize::MAX));
        assert_eq!(attempt.current_index(), 2);

        assert!(attempt.jump_to(0));
        assert_eq!(attempt.current_question().id(), &QuestionId::new("q1"));
    }

    #[test]
    fn select_answer_ignores_unknown_question_and_option() {
        let mut attempt = build(2, 1);
        assert!(!attempt.select_answer(&QuestionId::new("other"), "Alpha"));
        assert!(!attempt.select_answer(&QuestionId::new("q1"), "Delta"));
        assert_eq!(attempt.answered_count(), 0);

        assert!(attempt.select_answer(&QuestionId::new("q1"), "Alpha"));
        assert!(attempt.select_answer(&QuestionId::new("q1"), "Gamma"));
        assert_eq!(attempt.answered_count(), 1);
        assert_eq!(attempt.answer_for(&QuestionId::new("q1")), Some("Gamma"));
    }

    #[test]
    fn countdown_expires_once_and_freezes_while_submitting() {
        let mut attempt = build(1, 1);
        for _ in 0..59 {
            assert!(matches!(attempt.tick(), TickOutcome::Ticked { .. }));
        }
        assert_eq!(attempt.tick(), TickOutcome::Expired);
        assert_eq!(attempt.remaining_secs(), 0);

        attempt.begin_submit(SubmitTrigger::Timeout).unwrap();
        assert_eq!(attempt.tick(), TickOutcome::Frozen);
        assert_eq!(attempt.remaining_secs(), 0);
    }

    #[test]
    fn second_begin_submit_is_rejected() {
        let mut attempt = build(2, 1);
        attempt.begin_submit(SubmitTrigger::Manual).unwrap();
        let err = attempt.begin_submit(SubmitTrigger::Timeout).unwrap_err();
        assert_eq!(
            err,
            AttemptError::InvalidTransition {
                from: "submitting",
                to: "submitting"
            }
        );
    }

    #[test]
    fn declined_confirmation_resumes_attempt() {
        let mut attempt = build(5, 1);
        attempt.jump_to(3);
        attempt.select_answer(&QuestionId::new("q1"), "Beta");
        assert!(attempt.requires_confirmation(SubmitTrigger::Manual));
        assert!(!attempt.requires_confirmation(SubmitTrigger::Timeout));

        attempt.begin_submit(SubmitTrigger::Manual).unwrap();
        attempt.cancel_submit().unwrap();
        assert!(attempt.is_in_progress());
        assert_eq!(attempt.current_index(), 3);
    }

    #[test]
    fn failed_attempt_can_only_be_retried_explicitly() {
        let mut attempt = build(1, 1);
        attempt.begin_submit(SubmitTrigger::Manual).unwrap();
        attempt.fail("network down").unwrap();
        assert!(attempt.begin_submit(SubmitTrigger::Manual).is_err());
        assert!(!attempt.select_answer(&QuestionId::new("q1"), "Beta"));

        attempt.begin_submit(SubmitTrigger::Retry).unwrap();
        attempt
            .complete(QuizResult::new(ResultId::new("r"), 100.0, true, Vec::new()))
            .unwrap();
        assert_eq!(attempt.status().label(), "completed");
    }

    #[test]
    fn submission_is_positional_and_backdates_start() {
        let mut attempt = build(3, 1);
        attempt.select_answer(&QuestionId::new("q3"), "Gamma");
        attempt.select_answer(&QuestionId::new("q1"), "Alpha");
        for _ in 0..10 {
            attempt.tick();
        }

        let now = fixed_now();
        let draft = attempt.submission(now);
        assert_eq!(
            draft.answers,
            vec![Some("Alpha".to_string()), None, Some("Gamma".to_string())]
        );
        assert_eq!(
            draft.question_ids,
            vec![
                QuestionId::new("q1"),
                QuestionId::new("q2"),
                QuestionId::new("q3")
            ]
        );
        assert_eq!(draft.started_at, now - Duration::seconds(10));
    }
}
