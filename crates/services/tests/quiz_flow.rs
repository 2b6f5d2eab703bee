use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{
    Assessment, AssessmentId, CourseId, Destination, Question, QuestionId, QuizResult, ResultId,
};
use quiz_core::scoring::Tally;
use quiz_core::time::fixed_clock;
use reqwest::StatusCode;
use services::{
    AlwaysConfirm, FailureStage, InMemoryAssessmentApi, QuizPhase, QuizService, QuizSession,
    SubmitConfirmation, SubmitOutcome, SubmitReply,
};

/// Records every prompt and answers with a fixed choice.
struct ScriptedConfirm {
    answer: bool,
    asked: Mutex<Vec<usize>>,
}

impl ScriptedConfirm {
    fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    fn asked(&self) -> Vec<usize> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmitConfirmation for ScriptedConfirm {
    async fn confirm_unanswered(&self, unanswered: usize) -> bool {
        self.asked.lock().unwrap().push(unanswered);
        self.answer
    }
}

fn qids(n: usize) -> Vec<QuestionId> {
    (1..=n).map(|i| QuestionId::new(format!("q{i}"))).collect()
}

/// `n` questions whose correct answer is always "B", limited to one minute.
fn seed(api: &InMemoryAssessmentApi, n: usize) -> AssessmentId {
    let ids = qids(n);
    for id in &ids {
        api.insert_question(
            Question::new(
                id.clone(),
                format!("What about {id}?"),
                vec!["A".into(), "B".into(), "C".into()],
                "b",
                vec![format!("topic-{id}")],
            )
            .unwrap(),
        );
    }
    let assessment_id = AssessmentId::new("a1");
    api.insert_assessment(
        Assessment::new(
            assessment_id.clone(),
            "Traits and generics",
            1,
            CourseId::new("c1"),
            ids,
        )
        .unwrap(),
    );
    assessment_id
}

async fn start(n: usize) -> (Arc<InMemoryAssessmentApi>, QuizSession) {
    let api = Arc::new(InMemoryAssessmentApi::new());
    let id = seed(&api, n);
    let service = QuizService::new(api.clone(), fixed_clock());
    let session = service.start(id).await.unwrap();
    (api, session)
}

fn answer_first(session: &QuizSession, count: usize, option: &str) {
    for id in qids(count) {
        assert!(session.select_answer(&id, option));
    }
}

#[tokio::test(start_paused = true)]
async fn all_correct_answers_submit_once_with_aligned_payload() {
    let (api, session) = start(3).await;
    answer_first(&session, 3, "B");
    let confirm = ScriptedConfirm::new(false);

    let SubmitOutcome::Submitted(receipt) = session.submit(&confirm).await else {
        panic!("expected a graded submission");
    };

    assert_eq!(receipt.tally, Tally { correct: 3, total: 3 });
    assert!(confirm.asked().is_empty());
    assert_eq!(api.submit_calls(), 1);
    let (submitted_for, draft) = &api.submissions()[0];
    assert_eq!(submitted_for.as_str(), "a1");
    assert_eq!(draft.answers, vec![Some("B".to_string()); 3]);
    assert_eq!(draft.question_ids, qids(3));
    assert_eq!(
        receipt.destination,
        Destination::Results {
            assessment_id: AssessmentId::new("a1")
        }
    );
}

#[tokio::test(start_paused = true)]
async fn expired_timer_auto_submits_once_without_confirmation() {
    let (api, session) = start(5).await;

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(api.submit_calls(), 1);
    let (_, draft) = &api.submissions()[0];
    assert_eq!(draft.answers, vec![None; 5]);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.submit_calls(), 1);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.remaining_secs, 0);
    assert_eq!(
        snapshot.phase,
        QuizPhase::Completed(Destination::Advice {
            course_id: CourseId::new("c1")
        })
    );

    let confirm = ScriptedConfirm::new(true);
    assert_eq!(session.submit(&confirm).await, SubmitOutcome::Ignored);
    assert!(confirm.asked().is_empty());
}

#[tokio::test(start_paused = true)]
async fn declining_confirmation_resumes_at_same_question() {
    let (api, session) = start(5).await;
    answer_first(&session, 3, "A");
    assert!(session.jump_to(3));
    let confirm = ScriptedConfirm::new(false);

    assert_eq!(session.submit(&confirm).await, SubmitOutcome::Cancelled);

    assert_eq!(confirm.asked(), vec![2]);
    assert_eq!(api.submit_calls(), 0);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::InProgress);
    assert_eq!(snapshot.current_index, 3);

    // Still answerable after the decline.
    assert!(session.select_answer(&QuestionId::new("q4"), "C"));
}

#[tokio::test(start_paused = true)]
async fn low_score_routes_to_course_advice() {
    let (api, session) = start(2).await;
    answer_first(&session, 2, "A");
    api.push_reply(SubmitReply::Graded(QuizResult::new(
        ResultId::new("r42"),
        42.0,
        false,
        vec!["generics".into()],
    )));

    let SubmitOutcome::Submitted(receipt) = session.submit(&AlwaysConfirm).await else {
        panic!("expected a graded submission");
    };

    let advice = Destination::Advice {
        course_id: CourseId::new("c1"),
    };
    assert_eq!(receipt.destination, advice);
    assert_eq!(receipt.result.knowledge_gaps, vec!["generics"]);
    assert_eq!(session.snapshot().phase, QuizPhase::Completed(advice));
}

#[tokio::test(start_paused = true)]
async fn concurrent_submits_make_one_call() {
    let (api, session) = start(2).await;
    answer_first(&session, 2, "B");
    let release = api.hold_submissions();

    let (first, second, ()) = tokio::join!(
        session.submit(&AlwaysConfirm),
        async {
            tokio::task::yield_now().await;
            session.submit(&AlwaysConfirm).await
        },
        async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            release.notify_one();
        },
    );

    assert!(matches!(first, SubmitOutcome::Submitted(_)));
    assert_eq!(second, SubmitOutcome::Ignored);
    assert_eq!(api.submit_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_submission_can_be_retried_explicitly() {
    let (api, session) = start(2).await;
    answer_first(&session, 2, "B");
    api.push_reply(SubmitReply::Rejected {
        status: StatusCode::BAD_GATEWAY,
        message: "grader offline".into(),
    });

    let SubmitOutcome::Failed {
        message,
        unauthorized,
    } = session.submit(&AlwaysConfirm).await
    else {
        panic!("expected a failed submission");
    };
    assert!(message.contains("grader offline"));
    assert!(!unauthorized);
    let QuizPhase::Failed(failure) = session.snapshot().phase else {
        panic!("expected failed phase");
    };
    assert_eq!(failure.stage, FailureStage::Submit);

    // A plain submit does not sneak past the failed state.
    assert_eq!(session.submit(&AlwaysConfirm).await, SubmitOutcome::Ignored);

    assert!(matches!(
        session.retry_submit().await,
        SubmitOutcome::Submitted(_)
    ));
    assert_eq!(api.submit_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn unauthorized_submission_is_flagged() {
    let (api, session) = start(1).await;
    api.push_reply(SubmitReply::Unauthorized);

    let outcome = session.submit(&AlwaysConfirm).await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed {
            unauthorized: true,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn failed_load_can_be_retried() {
    let api = Arc::new(InMemoryAssessmentApi::new());
    let service = QuizService::new(api.clone(), fixed_clock());
    let session = service.session(AssessmentId::new("a1"));

    assert!(session.load().await.is_err());
    let QuizPhase::Failed(failure) = session.snapshot().phase else {
        panic!("expected failed phase");
    };
    assert_eq!(failure.stage, FailureStage::Load);

    seed(&api, 2);
    session.load().await.unwrap();
    assert_eq!(session.snapshot().phase, QuizPhase::InProgress);
    assert!(session.load().await.is_err());
}
