use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use quiz_core::model::{AssessmentId, QuestionId};
use services::{FailureStage, QuizPhase, QuizSession, QuizSnapshot, SubmitOutcome};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::vm::{
    CompletedQuiz, ConfirmBridge, OptionVm, PickerItemVm, QuestionVm, countdown_vm,
    map_current_question, map_picker, progress_label, unanswered_message,
};

#[component]
pub fn AssessmentView(id: String) -> Element {
    match id.parse::<AssessmentId>() {
        Ok(assessment_id) => rsx! {
            QuizRunner { key: "{assessment_id}", assessment_id }
        },
        Err(_) => rsx! {
            div { class: "page",
                p { class: "error", "{ViewError::NotFound.message()}" }
                Link { to: Route::Home {}, "Back to assessments" }
            }
        },
    }
}

fn picker_class(item: &PickerItemVm) -> &'static str {
    match (item.current, item.answered) {
        (true, _) => "picker-item current",
        (false, true) => "picker-item answered",
        (false, false) => "picker-item",
    }
}

/// Owns one `QuizSession` for as long as the view is mounted.
#[component]
fn QuizRunner(assessment_id: AssessmentId) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let session = use_hook(|| Arc::new(ctx.quiz().session(assessment_id.clone())));
    let bridge = use_hook(ConfirmBridge::new);

    let mut snapshot = use_signal(QuizSnapshot::default);
    let mut load_error = use_signal(|| None::<ViewError>);
    let mut dialog = use_signal(|| None::<usize>);

    {
        let session = Arc::clone(&session);
        use_drop(move || session.dispose());
    }

    // Load, then mirror every published snapshot (ticks included) into the view.
    {
        let session = Arc::clone(&session);
        let ctx = ctx.clone();
        use_future(move || {
            let session = Arc::clone(&session);
            let ctx = ctx.clone();
            async move {
                if !ctx.is_signed_in() {
                    navigator.replace(Route::Login {});
                    return;
                }
                let mut rx = session.subscribe();
                if let Err(err) = session.load().await {
                    let view_err = ViewError::from(&err);
                    if view_err == ViewError::Unauthorized {
                        navigator.replace(Route::Login {});
                        return;
                    }
                    load_error.set(Some(view_err));
                }
                loop {
                    let current = rx.borrow_and_update().clone();
                    if let QuizPhase::Completed(destination) = &current.phase {
                        if let Some(done) = session.with_attempt(CompletedQuiz::from_attempt).flatten()
                        {
                            ctx.record_completion(done);
                        }
                        navigator.replace(Route::for_destination(destination));
                        snapshot.set(current);
                        break;
                    }
                    if matches!(current.phase, QuizPhase::Failed(_)) && !ctx.is_signed_in() {
                        navigator.replace(Route::Login {});
                    }
                    snapshot.set(current);
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            }
        });
    }

    {
        let bridge = bridge.clone();
        use_future(move || {
            let bridge = bridge.clone();
            async move {
                loop {
                    bridge.requested().await;
                    dialog.set(bridge.pending_unanswered());
                }
            }
        });
    }

    let handle_outcome = use_callback(move |outcome: SubmitOutcome| match outcome {
        SubmitOutcome::Cancelled => dialog.set(None),
        SubmitOutcome::Failed {
            unauthorized: true, ..
        } => {
            navigator.replace(Route::Login {});
        }
        SubmitOutcome::Failed { message, .. } => {
            tracing::warn!(%message, "submission failed");
        }
        SubmitOutcome::Submitted(_) | SubmitOutcome::Ignored => {}
    });

    let select = {
        let session = Arc::clone(&session);
        use_callback(move |(question_id, option): (QuestionId, String)| {
            session.select_answer(&question_id, &option);
        })
    };
    let jump = {
        let session = Arc::clone(&session);
        use_callback(move |index: usize| {
            session.jump_to(index);
        })
    };
    let previous = {
        let session = Arc::clone(&session);
        use_callback(move |()| {
            session.go_to_previous();
        })
    };
    let next = {
        let session = Arc::clone(&session);
        use_callback(move |()| {
            session.go_to_next();
        })
    };
    let submit = {
        let session = Arc::clone(&session);
        let bridge = bridge.clone();
        use_callback(move |()| {
            let session = Arc::clone(&session);
            let bridge = bridge.clone();
            spawn(async move {
                let outcome = session.submit(&bridge).await;
                handle_outcome.call(outcome);
            });
        })
    };
    let retry = {
        let session = Arc::clone(&session);
        use_callback(move |()| {
            let session = Arc::clone(&session);
            spawn(async move {
                let outcome = session.retry_submit().await;
                handle_outcome.call(outcome);
            });
        })
    };
    let reload = {
        let session = Arc::clone(&session);
        use_callback(move |()| {
            let session = Arc::clone(&session);
            spawn(async move {
                match session.load().await {
                    Ok(()) => load_error.set(None),
                    Err(err) => load_error.set(Some(ViewError::from(&err))),
                }
            });
        })
    };
    let answer_dialog = {
        let bridge = bridge.clone();
        use_callback(move |submit_anyway: bool| {
            bridge.answer(submit_anyway);
            dialog.set(None);
        })
    };

    let snap = snapshot();
    let body = match &snap.phase {
        QuizPhase::Idle | QuizPhase::Loading => rsx! {
            p { "Loading..." }
        },
        QuizPhase::Failed(failure) if failure.stage == FailureStage::Load => {
            let message = load_error().unwrap_or(ViewError::Unknown).message();
            rsx! {
                p { class: "error", "{message}" }
                button { onclick: move |_| reload.call(()), "Try again" }
                Link { to: Route::Home {}, "Back to assessments" }
            }
        }
        QuizPhase::Completed(_) => rsx! {
            p { "Submitted. Loading your result..." }
        },
        _ => rsx! {
            QuizBody {
                session: SessionHandle(Arc::clone(&session)),
                snapshot: snap.clone(),
                on_select: select,
                on_jump: jump,
                on_previous: previous,
                on_next: next,
                on_submit: submit,
                on_retry: retry,
            }
        },
    };

    rsx! {
        div { class: "page quiz",
            {body}
            if let Some(unanswered) = dialog() {
                ConfirmDialog { unanswered, on_answer: answer_dialog }
            }
        }
    }
}

/// Props wrapper; sessions compare by identity.
#[derive(Clone)]
struct SessionHandle(Arc<QuizSession>);

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[component]
fn QuizBody(
    session: SessionHandle,
    snapshot: QuizSnapshot,
    on_select: EventHandler<(QuestionId, String)>,
    on_jump: EventHandler<usize>,
    on_previous: EventHandler<()>,
    on_next: EventHandler<()>,
    on_submit: EventHandler<()>,
    on_retry: EventHandler<()>,
) -> Element {
    let session = &session.0;
    let title = session
        .with_attempt(|attempt| attempt.title().to_string())
        .unwrap_or_default();
    let question = session.with_attempt(map_current_question);
    let picker = session.with_attempt(map_picker).unwrap_or_default();
    let countdown = countdown_vm(&snapshot);
    let progress = progress_label(&snapshot);
    let busy = snapshot.phase == QuizPhase::Submitting;
    let submit_failure = match &snapshot.phase {
        QuizPhase::Failed(failure) if failure.can_retry_submit() => Some(failure.message.clone()),
        _ => None,
    };
    let locked = busy || submit_failure.is_some();

    rsx! {
        div { class: "quiz-header",
            h2 { "{title}" }
            span { class: if countdown.low { "timer low" } else { "timer" }, "{countdown.label}" }
        }
        p { class: "progress", "{progress}" }

        nav { class: "picker",
            for item in picker {
                button {
                    key: "{item.index}",
                    class: picker_class(&item),
                    disabled: locked,
                    onclick: move |_| on_jump.call(item.index),
                    "{item.label}"
                }
            }
        }

        if let Some(question) = question {
            QuestionCard { question, disabled: locked, on_select }
        }

        div { class: "quiz-actions",
            button {
                disabled: locked || snapshot.is_first(),
                onclick: move |_| on_previous.call(()),
                "Previous"
            }
            button {
                disabled: locked || snapshot.is_last(),
                onclick: move |_| on_next.call(()),
                "Next"
            }
            button {
                class: "primary",
                disabled: locked,
                onclick: move |_| on_submit.call(()),
                if busy { "Submitting..." } else { "Submit" }
            }
        }

        if let Some(message) = submit_failure {
            div { class: "error",
                p { "Your answers were not submitted: {message}" }
                button { onclick: move |_| on_retry.call(()), "Retry submission" }
            }
        }
    }
}

#[component]
fn QuestionCard(
    question: QuestionVm,
    disabled: bool,
    on_select: EventHandler<(QuestionId, String)>,
) -> Element {
    rsx! {
        section { class: "question",
            p { class: "position", "{question.position_label}" }
            div { class: "prompt", dangerous_inner_html: "{question.prompt_html}" }
            ul { class: "options",
                for option in question.options.iter().cloned() {
                    OptionRow {
                        key: "{option.label}",
                        question_id: question.id.clone(),
                        option,
                        disabled,
                        on_select,
                    }
                }
            }
        }
    }
}

#[component]
fn OptionRow(
    question_id: QuestionId,
    option: OptionVm,
    disabled: bool,
    on_select: EventHandler<(QuestionId, String)>,
) -> Element {
    let name = question_id.to_string();
    let label = option.label.clone();
    rsx! {
        li {
            label { class: if option.selected { "option selected" } else { "option" },
                input {
                    r#type: "radio",
                    name: "{name}",
                    checked: option.selected,
                    disabled,
                    onchange: move |_| on_select.call((question_id.clone(), label.clone())),
                }
                "{option.label}"
            }
        }
    }
}

#[component]
fn ConfirmDialog(unanswered: usize, on_answer: EventHandler<bool>) -> Element {
    let message = unanswered_message(unanswered);
    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal", role: "dialog",
                h3 { "Submit now?" }
                p { "{message}" }
                div { class: "modal-actions",
                    button { onclick: move |_| on_answer.call(false), "Keep working" }
                    button { class: "primary", onclick: move |_| on_answer.call(true), "Submit anyway" }
                }
            }
        }
    }
}
