use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator};

use quiz_core::model::Destination;

use crate::context::AppContext;
use crate::views::{AdviceView, AssessmentView, HomeView, LoginView, ResultsView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/login", LoginView)] Login {},
        #[route("/assessments/:id", AssessmentView)] Assessment { id: String },
        #[route("/assessments/:assessment_id/results", ResultsView)] Results { assessment_id: String },
        #[route("/courses/:course_id/advice", AdviceView)] Advice { course_id: String },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            TopBar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn TopBar() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let signed_in = ctx.is_signed_in();

    let on_logout = move |_| {
        let auth = ctx.auth();
        spawn(async move {
            if let Err(err) = auth.logout().await {
                tracing::warn!(error = %err, "logout failed");
            }
            navigator.replace(Route::Login {});
        });
    };

    rsx! {
        header { class: "topbar",
            h1 { Link { to: Route::Home {}, "Assessments" } }
            if signed_in {
                button { class: "link", onclick: on_logout, "Sign out" }
            } else {
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}

impl Route {
    #[must_use]
    pub fn for_destination(destination: &Destination) -> Self {
        match destination {
            Destination::Advice { course_id } => Route::Advice {
                course_id: course_id.to_string(),
            },
            Destination::Results { assessment_id } => Route::Results {
                assessment_id: assessment_id.to_string(),
            },
        }
    }
}
