use std::collections::HashMap;

use quiz_core::model::{AssessmentId, Attempt, Question, QuestionId};

use crate::api::AssessmentApi;
use crate::error::QuizError;

/// Fetch an assessment and its questions, and start a fresh attempt.
///
/// # Errors
///
/// Returns `QuizError::Api` for backend failures, `QuizError::MissingQuestion`
/// if the bulk response lacks a requested id, and `QuizError::Attempt` for an
/// assessment without questions.
pub async fn load_attempt(
    api: &dyn AssessmentApi,
    id: &AssessmentId,
) -> Result<Attempt, QuizError> {
    let assessment = api.fetch_assessment(id).await?;
    let fetched = api.fetch_questions(assessment.question_ids()).await?;
    let questions = order_questions(assessment.question_ids(), fetched)?;
    tracing::debug!(
        assessment_id = %id,
        questions = questions.len(),
        time_limit_secs = assessment.time_limit_secs(),
        "assessment loaded"
    );
    Ok(Attempt::start(&assessment, questions)?)
}

/// Arrange `fetched` in the order of `ids`. Unrequested questions are dropped.
fn order_questions(ids: &[QuestionId], fetched: Vec<Question>) -> Result<Vec<Question>, QuizError> {
    let mut by_id: HashMap<QuestionId, Question> = fetched
        .into_iter()
        .map(|question| (question.id().clone(), question))
        .collect();
    ids.iter()
        .map(|id| {
            by_id
                .remove(id)
                .ok_or_else(|| QuizError::MissingQuestion(id.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Assessment, AttemptError, CourseId};

    use crate::api::InMemoryAssessmentApi;

    fn question(id: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Prompt {id}"),
            vec!["A".into(), "B".into()],
            "A",
            Vec::new(),
        )
        .unwrap()
    }

    fn ids(raw: &[&str]) -> Vec<QuestionId> {
        raw.iter().map(|id| QuestionId::new(*id)).collect()
    }

    #[test]
    fn questions_follow_requested_order() {
        let ordered = order_questions(
            &ids(&["q3", "q1", "q2"]),
            vec![question("q1"), question("q2"), question("q3"), question("q9")],
        )
        .unwrap();
        let got: Vec<&str> = ordered.iter().map(|q| q.id().as_str()).collect();
        assert_eq!(got, ["q3", "q1", "q2"]);
    }

    #[test]
    fn missing_question_is_an_error() {
        let err = order_questions(&ids(&["q1", "q2"]), vec![question("q1")]).unwrap_err();
        assert!(matches!(err, QuizError::MissingQuestion(id) if id.as_str() == "q2"));
    }

    #[tokio::test]
    async fn load_attempt_reorders_and_starts() {
        let api = InMemoryAssessmentApi::new();
        for id in ["q1", "q2", "q3"] {
            api.insert_question(question(id));
        }
        api.insert_assessment(
            Assessment::new(
                AssessmentId::new("a1"),
                "Borrowing",
                5,
                CourseId::new("c1"),
                ids(&["q2", "q3", "q1"]),
            )
            .unwrap(),
        );

        let attempt = load_attempt(&api, &AssessmentId::new("a1")).await.unwrap();
        assert_eq!(attempt.current_question().id().as_str(), "q2");
        assert_eq!(attempt.remaining_secs(), 300);
    }

    #[tokio::test]
    async fn empty_assessment_cannot_start() {
        let api = InMemoryAssessmentApi::new();
        api.insert_assessment(
            Assessment::new(
                AssessmentId::new("a1"),
                "Empty",
                5,
                CourseId::new("c1"),
                Vec::new(),
            )
            .unwrap(),
        );

        let err = load_attempt(&api, &AssessmentId::new("a1")).await.unwrap_err();
        assert!(matches!(err, QuizError::Attempt(AttemptError::NoQuestions)));
    }

    #[tokio::test]
    async fn unknown_assessment_surfaces_api_error() {
        let api = InMemoryAssessmentApi::new();
        let err = load_attempt(&api, &AssessmentId::new("nope")).await.unwrap_err();
        assert!(matches!(err, QuizError::Api(_)));
    }
}
