use dioxus::prelude::*;
use dioxus_router::use_navigator;
use services::{ApiError, AuthError};

use crate::context::AppContext;
use crate::routes::Route;

fn login_error_message(err: &AuthError) -> &'static str {
    match err {
        AuthError::MissingCredentials => "Enter your email and password.",
        AuthError::Api(ApiError::Unauthorized | ApiError::HttpStatus { .. }) => {
            "Email or password is incorrect."
        }
        _ => "Could not sign in. Please try again.",
    }
}

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let expired = use_hook(|| ctx.take_session_expired());

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<&'static str>);
    let mut busy = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        busy.set(true);
        let ctx = ctx.clone();
        let (email, password) = (email(), password());
        spawn(async move {
            match ctx.auth().login(&email, &password).await {
                Ok(()) => {
                    error.set(None);
                    navigator.replace(Route::Home {});
                }
                Err(err) => {
                    tracing::warn!(error = %err, "sign-in failed");
                    // A rejected login also trips the expiry hook; it is not an expiry.
                    let _ = ctx.take_session_expired();
                    error.set(Some(login_error_message(&err)));
                }
            }
            busy.set(false);
        });
    };

    rsx! {
        div { class: "page login",
            h2 { "Sign in" }
            if expired {
                p { class: "notice", "Your session has expired. Please sign in again." }
            }
            form { onsubmit: on_submit,
                label { r#for: "email", "Email" }
                input {
                    id: "email",
                    r#type: "email",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                label { r#for: "password", "Password" }
                input {
                    id: "password",
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                button { class: "primary", r#type: "submit", disabled: busy(),
                    if busy() { "Signing in..." } else { "Sign in" }
                }
            }
            if let Some(message) = error() {
                p { class: "error", "{message}" }
            }
        }
    }
}
