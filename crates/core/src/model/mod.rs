mod assessment;
mod attempt;
mod ids;
mod question;
mod result;

pub use assessment::{Assessment, AssessmentError};
pub use attempt::{
    Attempt, AttemptError, AttemptStatus, SubmissionDraft, SubmitTrigger, TickOutcome,
};
pub use ids::{AssessmentId, CourseId, ParseIdError, QuestionId, ResultId};
pub use question::{Question, QuestionError};
pub use result::{Destination, QuizResult, PASS_THRESHOLD};
