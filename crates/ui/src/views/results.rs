use dioxus::prelude::*;
use dioxus_router::Link;
use quiz_core::model::AssessmentId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::{ReviewRowVm, map_results};

#[component]
pub fn ResultsView(assessment_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let vm = assessment_id
        .parse::<AssessmentId>()
        .ok()
        .and_then(|id| ctx.completion_for_assessment(&id))
        .map(|done| map_results(&done));

    let Some(vm) = vm else {
        return rsx! {
            div { class: "page",
                h2 { "Results" }
                p { "There is no result to show yet. Take the assessment first." }
                Link { to: Route::Assessment { id: assessment_id.clone() }, "Start assessment" }
            }
        };
    };

    rsx! {
        div { class: "page results",
            h2 { "{vm.title}" }
            div { class: if vm.passed { "score passed" } else { "score" },
                span { class: "score-value", "{vm.score_label}" }
                span { class: "verdict", "{vm.verdict}" }
            }
            p { class: "meta", "{vm.correct_label} | Time spent: {vm.time_spent}" }

            h3 { "Review" }
            ol { class: "review",
                for row in vm.rows {
                    ReviewRow { key: "{row.number}", row }
                }
            }

            Link { to: Route::Home {}, "Back to assessments" }
        }
    }
}

#[component]
fn ReviewRow(row: ReviewRowVm) -> Element {
    let selected = row.selected.clone().unwrap_or_else(|| "No answer".to_string());
    rsx! {
        li { class: if row.is_correct { "review-row correct" } else { "review-row incorrect" },
            div { class: "prompt", dangerous_inner_html: "{row.prompt_html}" }
            p { "Your answer: {selected}" }
            if !row.is_correct {
                p { class: "correct-answer", "Correct answer: {row.correct_answer}" }
            }
        }
    }
}
