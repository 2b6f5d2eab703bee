//! JSON shapes exchanged with the REST backend.
//!
//! DTOs stay private to the `api` module; everything crossing the boundary is
//! converted into validated `quiz_core` models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quiz_core::model::{
    Assessment, AssessmentId, CourseId, Question, QuestionId, QuizResult, ResultId,
    SubmissionDraft,
};

use crate::error::ApiError;

/// Reference fields may arrive as a bare id or as a populated document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum IdRef {
    Bare(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl IdRef {
    fn into_string(self) -> String {
        match self {
            IdRef::Bare(id) | IdRef::Populated { id } => id,
        }
    }
}

//
// ─── ASSESSMENT ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(super) struct AssessmentEnvelope {
    pub assessment: AssessmentDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct AssessmentDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// Minutes.
    pub time_limit: u32,
    pub course_id: IdRef,
    #[serde(default)]
    pub questions: Vec<IdRef>,
}

impl AssessmentDto {
    pub fn into_model(self) -> Result<Assessment, ApiError> {
        let question_ids = self
            .questions
            .into_iter()
            .map(|q| QuestionId::new(q.into_string()))
            .collect();
        Ok(Assessment::new(
            AssessmentId::new(self.id),
            self.title,
            self.time_limit,
            CourseId::new(self.course_id.into_string()),
            question_ids,
        )?)
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(super) struct BulkQuestionsRequest<'a> {
    pub question_ids: &'a [QuestionId],
}

/// The bulk endpoint answers with a bare list; some deployments wrap it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum QuestionsResponse {
    List(Vec<QuestionDto>),
    Wrapped { questions: Vec<QuestionDto> },
}

impl QuestionsResponse {
    pub fn into_vec(self) -> Vec<QuestionDto> {
        match self {
            QuestionsResponse::List(list) | QuestionsResponse::Wrapped { questions: list } => list,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct QuestionDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QuestionDto {
    pub fn into_model(self) -> Result<Question, ApiError> {
        Ok(Question::new(
            QuestionId::new(self.id),
            self.question_text,
            self.options,
            self.correct_answer,
            self.tags,
        )?)
    }
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(super) struct SubmitRequest<'a> {
    pub answers: &'a [Option<String>],
    pub started_at: DateTime<Utc>,
    pub questions_id: &'a [QuestionId],
}

impl<'a> From<&'a SubmissionDraft> for SubmitRequest<'a> {
    fn from(draft: &'a SubmissionDraft) -> Self {
        Self {
            answers: &draft.answers,
            started_at: draft.started_at,
            questions_id: &draft.question_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SubmitResponse {
    pub result: ResultDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResultDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub score: f64,
    pub passed: bool,
    #[serde(default)]
    pub knowledge_gaps: Vec<Value>,
}

impl ResultDto {
    pub fn into_model(self) -> QuizResult {
        let gaps = self.knowledge_gaps.iter().filter_map(gap_label).collect();
        QuizResult::new(ResultId::new(self.id), self.score, self.passed, gaps)
    }
}

/// Gaps are plain topic strings or objects naming the topic.
fn gap_label(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.as_str(),
        Value::Object(map) => ["topic", "tag", "name", "title"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))?,
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn assessment_accepts_bare_and_populated_refs() {
        let json = r#"{
            "assessment": {
                "_id": "a1",
                "title": "Ownership basics",
                "time_limit": 10,
                "course_id": {"_id": "c9", "title": "Rust"},
                "questions": ["q1", {"_id": "q2"}]
            }
        }"#;
        let envelope: AssessmentEnvelope = serde_json::from_str(json).unwrap();
        let assessment = envelope.assessment.into_model().unwrap();

        assert_eq!(assessment.course_id(), &CourseId::new("c9"));
        assert_eq!(
            assessment.question_ids(),
            &[QuestionId::new("q1"), QuestionId::new("q2")]
        );
        assert_eq!(assessment.time_limit_secs(), 600);
    }

    #[test]
    fn assessment_with_zero_time_limit_is_a_decode_error() {
        let dto = AssessmentDto {
            id: "a1".into(),
            title: "T".into(),
            time_limit: 0,
            course_id: IdRef::Bare("c1".into()),
            questions: Vec::new(),
        };
        assert!(matches!(dto.into_model(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn questions_response_accepts_list_or_wrapper() {
        let item = r#"{"_id":"q1","question_text":"Pick","options":["A","B"],"correct_answer":"A"}"#;
        let list: QuestionsResponse = serde_json::from_str(&format!("[{item}]")).unwrap();
        let wrapped: QuestionsResponse =
            serde_json::from_str(&format!(r#"{{"questions":[{item}]}}"#)).unwrap();

        assert_eq!(list.into_vec().len(), 1);
        let wrapped = wrapped.into_vec();
        assert_eq!(wrapped.len(), 1);
        assert!(wrapped[0].tags.is_empty());
    }

    #[test]
    fn submit_request_serializes_nulls_in_order() {
        let draft = SubmissionDraft {
            answers: vec![Some("A".into()), None],
            started_at: fixed_now(),
            question_ids: vec![QuestionId::new("q1"), QuestionId::new("q2")],
        };
        let value = serde_json::to_value(SubmitRequest::from(&draft)).unwrap();

        assert_eq!(value["answers"], serde_json::json!(["A", null]));
        assert_eq!(value["questions_id"], serde_json::json!(["q1", "q2"]));
        assert!(value["started_at"].is_string());
    }

    #[test]
    fn result_maps_mixed_knowledge_gaps() {
        let json = r#"{"result":{"_id":"r1","score":40,"passed":false,
            "knowledge_gaps":["lifetimes",{"topic":"traits"},{"other":1}," "]}}"#;
        let response: SubmitResponse = serde_json::from_str(json).unwrap();
        let result = response.result.into_model();

        assert_eq!(result.knowledge_gaps, vec!["lifetimes", "traits"]);
        assert!(result.needs_remediation());
    }
}
