use dioxus::prelude::*;
use dioxus_router::Link;
use quiz_core::model::CourseId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::map_advice;

#[component]
pub fn AdviceView(course_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let done = course_id
        .parse::<CourseId>()
        .ok()
        .and_then(|id| ctx.completion_for_course(&id));

    let Some(done) = done else {
        return rsx! {
            div { class: "page",
                h2 { "Study advice" }
                p { "Complete an assessment in this course to get study advice." }
                Link { to: Route::Home {}, "Back to assessments" }
            }
        };
    };
    let vm = map_advice(&done);
    let retake = done.assessment_id.to_string();

    rsx! {
        div { class: "page advice",
            h2 { "Let's review before moving on" }
            p { "You scored {vm.score_label} on {vm.title}." }
            if vm.gaps.is_empty() {
                p { "Review the course material and try again when you are ready." }
            } else {
                p { "Focus on these topics:" }
                ul { class: "gaps",
                    for gap in vm.gaps.iter() {
                        li { key: "{gap}", "{gap}" }
                    }
                }
            }
            Link { to: Route::Assessment { id: retake }, "Retake the assessment" }
            Link { to: Route::Home {}, "Back to assessments" }
        }
    }
}
