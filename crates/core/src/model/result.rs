use crate::model::ids::{AssessmentId, CourseId, ResultId};

/// Scores strictly below this send the learner to remediation content.
pub const PASS_THRESHOLD: f64 = 50.0;

/// Authoritative verdict returned by the backend for a submitted attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub id: ResultId,
    /// Percentage in `0.0..=100.0`.
    pub score: f64,
    pub passed: bool,
    pub knowledge_gaps: Vec<String>,
}

impl QuizResult {
    #[must_use]
    pub fn new(id: ResultId, score: f64, passed: bool, knowledge_gaps: Vec<String>) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            id,
            score,
            passed,
            knowledge_gaps,
        }
    }

    #[must_use]
    pub fn needs_remediation(&self) -> bool {
        self.score < PASS_THRESHOLD
    }

    /// Where the learner goes after this result.
    #[must_use]
    pub fn destination(&self, assessment_id: &AssessmentId, course_id: &CourseId) -> Destination {
        if self.needs_remediation() {
            Destination::Advice {
                course_id: course_id.clone(),
            }
        } else {
            Destination::Results {
                assessment_id: assessment_id.clone(),
            }
        }
    }
}

/// Post-submission navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Advice { course_id: CourseId },
    Results { assessment_id: AssessmentId },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: f64) -> QuizResult {
        QuizResult::new(ResultId::new("r1"), score, score >= 50.0, Vec::new())
    }

    #[test]
    fn low_score_routes_to_advice() {
        let dest = result(42.0).destination(&AssessmentId::new("a1"), &CourseId::new("c1"));
        assert_eq!(
            dest,
            Destination::Advice {
                course_id: CourseId::new("c1")
            }
        );
    }

    #[test]
    fn threshold_score_routes_to_results() {
        let dest = result(50.0).destination(&AssessmentId::new("a1"), &CourseId::new("c1"));
        assert_eq!(
            dest,
            Destination::Results {
                assessment_id: AssessmentId::new("a1")
            }
        );
    }

    #[test]
    fn score_is_clamped() {
        assert!((result(140.0).score - 100.0).abs() < f64::EPSILON);
        assert!(result(f64::NAN).score.abs() < f64::EPSILON);
    }
}
