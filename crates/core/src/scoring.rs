//! Client-side tally used for immediate feedback before the backend verdict.

use std::collections::HashMap;

use crate::model::{Question, QuestionId};

/// Correct-answer count over the questions of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub correct: usize,
    pub total: usize,
}

/// Case-insensitive, ignoring surrounding whitespace on both sides.
#[must_use]
pub fn answers_match(selected: &str, correct: &str) -> bool {
    selected.trim().to_lowercase() == correct.trim().to_lowercase()
}

#[must_use]
pub fn tally(questions: &[Question], answers: &HashMap<QuestionId, String>) -> Tally {
    let correct = questions
        .iter()
        .filter(|question| {
            answers
                .get(question.id())
                .is_some_and(|answer| question.is_correct(answer))
        })
        .count();
    Tally {
        correct,
        total: questions.len(),
    }
}
