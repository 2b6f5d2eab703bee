use quiz_core::scoring::answers_match;

use super::markdown_vm::markdown_to_html;
use super::quiz_vm::CompletedQuiz;
use super::time_fmt::format_time_spent;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRowVm {
    pub number: usize,
    pub prompt_html: String,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub title: String,
    pub score_label: String,
    pub passed: bool,
    pub verdict: &'static str,
    pub correct_label: String,
    pub time_spent: String,
    pub rows: Vec<ReviewRowVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdviceVm {
    pub title: String,
    pub score_label: String,
    pub gaps: Vec<String>,
}

fn score_label(score: f64) -> String {
    format!("{}%", score.round())
}

/// Review rows compare answers case-insensitively, like the grader.
#[must_use]
pub fn map_review_rows(done: &CompletedQuiz) -> Vec<ReviewRowVm> {
    done.questions
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let selected = done.answers.get(question.id()).cloned();
            let is_correct = selected
                .as_deref()
                .is_some_and(|answer| answers_match(answer, question.correct_answer()));
            ReviewRowVm {
                number: idx + 1,
                prompt_html: markdown_to_html(question.prompt()),
                selected,
                correct_answer: question.correct_answer().to_string(),
                is_correct,
            }
        })
        .collect()
}

#[must_use]
pub fn map_results(done: &CompletedQuiz) -> ResultsVm {
    ResultsVm {
        title: done.title.clone(),
        score_label: score_label(done.result.score),
        passed: done.result.passed,
        verdict: if done.result.passed { "Passed" } else { "Not passed" },
        correct_label: format!("{} / {} correct", done.tally.correct, done.tally.total),
        time_spent: format_time_spent(done.time_spent_secs),
        rows: map_review_rows(done),
    }
}

/// Gaps from the server; falls back to tags of missed questions when the
/// server sent none.
#[must_use]
pub fn map_advice(done: &CompletedQuiz) -> AdviceVm {
    let mut gaps = done.result.knowledge_gaps.clone();
    if gaps.is_empty() {
        for question in &done.questions {
            let missed = done
                .answers
                .get(question.id())
                .is_none_or(|answer| !answers_match(answer, question.correct_answer()));
            if !missed {
                continue;
            }
            for tag in question.tags() {
                if !gaps.contains(tag) {
                    gaps.push(tag.clone());
                }
            }
        }
    }
    AdviceVm {
        title: done.title.clone(),
        score_label: score_label(done.result.score),
        gaps,
    }
}
