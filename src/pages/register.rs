//! Registration page; a successful sign-up lands directly on the dashboard.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

#[cfg(feature = "hydrate")]
use super::login::FormOutcome;
use super::login::{Submission, visible_error};
use crate::app::use_session;
use crate::components::navbar::Navbar;
use crate::net::types::Registration;

/// Blank optional inputs are sent as absent rather than empty strings.
fn optional_field(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}

fn build_registration(
    username: String,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
) -> Registration {
    Registration {
        username,
        email: email.trim().to_owned(),
        password,
        first_name: optional_field(first_name),
        last_name: optional_field(last_name),
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let Ok(ctx) = use_session() else {
        return view! { <p class="auth-message">"Session unavailable."</p> }.into_any();
    };
    let session = ctx.session;
    let store = ctx.store;
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let first_name = RwSignal::new(String::new());
    let last_name = RwSignal::new(String::new());
    let form_error = RwSignal::new(None::<String>);
    let submission = Submission::default();

    on_cleanup({
        let submission = submission.clone();
        let store = store.clone();
        move || {
            if submission.dispose() {
                store.invalidate();
            }
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if store.is_busy() {
            return;
        }
        form_error.set(None);
        let data = build_registration(
            username.get_untracked(),
            email.get_untracked(),
            password.get_untracked(),
            first_name.get_untracked(),
            last_name.get_untracked(),
        );

        #[cfg(feature = "hydrate")]
        {
            let store = store.clone();
            let navigate = navigate.clone();
            let submission = submission.clone();
            submission.start();
            leptos::task::spawn_local(async move {
                let result = store.register(data).await;
                match submission.settle(&result, "/dashboard") {
                    FormOutcome::Navigate(route) => navigate(route, NavigateOptions::default()),
                    FormOutcome::ShowError(message) => form_error.set(Some(message)),
                    FormOutcome::Ignore => {}
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (data, &navigate, &submission);
        }
    };

    let busy = move || session.get().is_loading();
    let message = move || visible_error(form_error.get(), session.get().error_message);

    view! {
        <Navbar/>
        <div class="auth-page">
            <div class="auth-card">
                <h2>"Create an Account"</h2>
                <Show when=move || message().is_some()>
                    <p class="auth-message auth-message--error">{move || message().unwrap_or_default()}</p>
                </Show>
                <form class="auth-form" on:submit=on_submit>
                    <label for="username">"Username"</label>
                    <input
                        id="username"
                        type="text"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                        disabled=busy
                    />
                    <label for="email">"Email"</label>
                    <input
                        id="email"
                        type="email"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                        disabled=busy
                    />
                    <label for="password">"Password"</label>
                    <input
                        id="password"
                        type="password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                        disabled=busy
                    />
                    <label for="first_name">"First Name"</label>
                    <input
                        id="first_name"
                        type="text"
                        prop:value=move || first_name.get()
                        on:input=move |ev| first_name.set(event_target_value(&ev))
                        disabled=busy
                    />
                    <label for="last_name">"Last Name"</label>
                    <input
                        id="last_name"
                        type="text"
                        prop:value=move || last_name.get()
                        on:input=move |ev| last_name.set(event_target_value(&ev))
                        disabled=busy
                    />
                    <button class="auth-button" type="submit" disabled=busy>
                        {move || if busy() { "Creating account..." } else { "Register" }}
                    </button>
                </form>
                <p class="auth-card__footer">
                    "Already have an account? "
                    <a href="/login">"Log in"</a>
                </p>
            </div>
        </div>
    }
    .into_any()
}
