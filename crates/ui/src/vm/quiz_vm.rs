use std::collections::HashMap;

use quiz_core::model::{
    AssessmentId, Attempt, AttemptStatus, CourseId, Question, QuestionId, QuizResult,
};
use quiz_core::scoring::Tally;
use services::QuizSnapshot;

use super::markdown_vm::markdown_to_html;
use super::time_fmt::format_clock;

/// Below this the countdown is rendered as a warning.
const LOW_TIME_SECS: u32 = 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: QuestionId,
    pub position_label: String,
    pub prompt_html: String,
    pub options: Vec<OptionVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickerItemVm {
    pub index: usize,
    pub label: String,
    pub answered: bool,
    pub current: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownVm {
    pub label: String,
    pub low: bool,
}

#[must_use]
pub fn countdown_vm(snapshot: &QuizSnapshot) -> CountdownVm {
    CountdownVm {
        label: format_clock(snapshot.remaining_secs),
        low: snapshot.remaining_secs < LOW_TIME_SECS,
    }
}

#[must_use]
pub fn map_current_question(attempt: &Attempt) -> QuestionVm {
    let question = attempt.current_question();
    let selected = attempt.answer_for(question.id());
    QuestionVm {
        id: question.id().clone(),
        position_label: format!(
            "Question {} of {}",
            attempt.current_index() + 1,
            attempt.question_count()
        ),
        prompt_html: markdown_to_html(question.prompt()),
        options: question
            .options()
            .iter()
            .map(|option| OptionVm {
                label: option.clone(),
                selected: selected == Some(option.as_str()),
            })
            .collect(),
    }
}

#[must_use]
pub fn map_picker(attempt: &Attempt) -> Vec<PickerItemVm> {
    attempt
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| PickerItemVm {
            index,
            label: (index + 1).to_string(),
            answered: attempt.answer_for(question.id()).is_some(),
            current: index == attempt.current_index(),
        })
        .collect()
}

#[must_use]
pub fn progress_label(snapshot: &QuizSnapshot) -> String {
    format!(
        "{} of {} answered",
        snapshot.answered_count, snapshot.question_count
    )
}

#[must_use]
pub fn unanswered_message(unanswered: usize) -> String {
    match unanswered {
        1 => "You have 1 unanswered question.".to_string(),
        n => format!("You have {n} unanswered questions."),
    }
}

/// A graded attempt kept in memory for the result screens.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedQuiz {
    pub assessment_id: AssessmentId,
    pub course_id: CourseId,
    pub title: String,
    pub questions: Vec<Question>,
    pub answers: HashMap<QuestionId, String>,
    pub result: QuizResult,
    pub tally: Tally,
    pub time_spent_secs: u32,
}

impl CompletedQuiz {
    /// `None` unless the attempt has been graded.
    #[must_use]
    pub fn from_attempt(attempt: &Attempt) -> Option<Self> {
        let AttemptStatus::Completed(result) = attempt.status() else {
            return None;
        };
        Some(Self {
            assessment_id: attempt.assessment_id().clone(),
            course_id: attempt.course_id().clone(),
            title: attempt.title().to_string(),
            questions: attempt.questions().to_vec(),
            answers: attempt.answers().clone(),
            result: result.clone(),
            tally: attempt.local_tally(),
            time_spent_secs: attempt.elapsed_secs(),
        })
    }
}
