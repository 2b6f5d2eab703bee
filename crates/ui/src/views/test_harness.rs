use std::collections::HashMap;
use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{
    Assessment, AssessmentId, CourseId, Question, QuestionId, QuizResult, ResultId,
};
use quiz_core::scoring::Tally;
use quiz_core::time::{fixed_clock, fixed_now};
use services::{
    ApiClient, ApiConfig, AuthService, AuthSession, InMemoryAssessmentApi, QuizService,
};
use storage::repository::{InMemoryTokenStore, TokenStore};

use crate::context::{AppContext, SessionExpiry, UiApp, build_app_context};
use crate::views::{AdviceView, AssessmentView, HomeView, LoginView, ResultsView};
use crate::vm::CompletedQuiz;

struct TestApp {
    quiz: QuizService,
    auth: AuthService,
    expiry: SessionExpiry,
}

impl UiApp for TestApp {
    fn quiz(&self) -> QuizService {
        self.quiz.clone()
    }

    fn auth(&self) -> AuthService {
        self.auth.clone()
    }

    fn session_expiry(&self) -> SessionExpiry {
        self.expiry.clone()
    }

    fn initial_assessment(&self) -> Option<AssessmentId> {
        None
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Login,
    Assessment(String),
    Results(String),
    Advice(String),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    ctx: AppContext,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    use_context_provider(|| props.ctx.clone());
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Login => rsx! { LoginView {} },
        ViewKind::Assessment(id) => rsx! { AssessmentView { id } },
        ViewKind::Results(assessment_id) => rsx! { ResultsView { assessment_id } },
        ViewKind::Advice(course_id) => rsx! { AdviceView { course_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub ctx: AppContext,
    pub api: Arc<InMemoryAssessmentApi>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive until `needle` shows up or the attempts run out.
    pub async fn drive_until(&mut self, needle: &str) -> String {
        for _ in 0..20 {
            let html = self.render();
            if html.contains(needle) {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Two questions (`q1`, `q2`) in assessment `a1` of course `c1`, one minute.
pub fn seed_assessment(api: &InMemoryAssessmentApi) {
    let ids = vec![QuestionId::new("q1"), QuestionId::new("q2")];
    api.insert_question(
        Question::new(
            ids[0].clone(),
            "Which type owns its heap data?",
            vec!["&str".into(), "String".into()],
            "String",
            vec!["ownership".into()],
        )
        .unwrap(),
    );
    api.insert_question(
        Question::new(
            ids[1].clone(),
            "Does `Vec<T>` implement `Copy`?",
            vec!["Yes".into(), "No".into()],
            "No",
            vec!["traits".into()],
        )
        .unwrap(),
    );
    api.insert_assessment(
        Assessment::new(
            AssessmentId::new("a1"),
            "Ownership check",
            1,
            CourseId::new("c1"),
            ids,
        )
        .unwrap(),
    );
}

pub fn completed_quiz(score: f64, gaps: Vec<String>) -> CompletedQuiz {
    let questions = vec![
        Question::new(
            QuestionId::new("q1"),
            "Which type owns its heap data?",
            vec!["&str".into(), "String".into()],
            "String",
            vec!["ownership".into()],
        )
        .unwrap(),
    ];
    let mut answers = HashMap::new();
    answers.insert(QuestionId::new("q1"), "string".to_string());
    CompletedQuiz {
        assessment_id: AssessmentId::new("a1"),
        course_id: CourseId::new("c1"),
        title: "Ownership check".into(),
        questions,
        answers,
        result: QuizResult::new(ResultId::new("r1"), score, score >= 50.0, gaps),
        tally: Tally {
            correct: 1,
            total: 1,
        },
        time_spent_secs: 42,
    }
}

pub async fn setup_view_harness(view: ViewKind, signed_in: bool) -> ViewHarness {
    let store = Arc::new(InMemoryTokenStore::new());
    if signed_in {
        store.save_token("test-token", fixed_now()).await.unwrap();
    }
    let expiry = SessionExpiry::default();
    let session = Arc::new(AuthSession::new(fixed_clock(), store, expiry.hook()));
    session.restore().await.unwrap();
    let client = ApiClient::new(ApiConfig::default(), Arc::clone(&session)).unwrap();

    let api = Arc::new(InMemoryAssessmentApi::new());
    seed_assessment(&api);

    let app: Arc<dyn UiApp> = Arc::new(TestApp {
        quiz: QuizService::new(api.clone(), fixed_clock()),
        auth: AuthService::new(client, session),
        expiry,
    });
    let ctx = build_app_context(&app);

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            ctx: ctx.clone(),
            view,
        },
    );

    ViewHarness { dom, ctx, api }
}
