use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use quiz_core::model::AssessmentId;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let signed_in = ctx.is_signed_in();
    let initial = ctx.initial_assessment();

    let mut assessment_input = use_signal(|| {
        initial
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    });
    let mut invalid = use_signal(|| false);
    let mut opened_initial = use_signal(|| false);

    // Jump straight into an assessment passed on the command line.
    use_effect(move || {
        if opened_initial() || !signed_in {
            return;
        }
        opened_initial.set(true);
        if let Some(id) = initial.as_ref() {
            navigator.push(Route::Assessment { id: id.to_string() });
        }
    });

    let on_start = move |evt: FormEvent| {
        evt.prevent_default();
        match assessment_input().parse::<AssessmentId>() {
            Ok(id) => {
                invalid.set(false);
                navigator.push(Route::Assessment { id: id.to_string() });
            }
            Err(_) => invalid.set(true),
        }
    };

    rsx! {
        div { class: "page",
            h2 { "Start an assessment" }

            if signed_in {
                form { class: "start-form", onsubmit: on_start,
                    label { r#for: "assessment-id", "Assessment id" }
                    input {
                        id: "assessment-id",
                        value: "{assessment_input}",
                        placeholder: "e.g. 65a1f0c2",
                        oninput: move |evt| assessment_input.set(evt.value()),
                    }
                    button { class: "primary", r#type: "submit", "Start" }
                }
                if invalid() {
                    p { class: "error", "Enter a valid assessment id." }
                }
            } else {
                p {
                    "You need to "
                    Link { to: Route::Login {}, "sign in" }
                    " before starting an assessment."
                }
            }
        }
    }
}
