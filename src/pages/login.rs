//! Login page: username + password against the session store.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::use_session;
use crate::components::navbar::Navbar;
use crate::net::error::ApiError;
use crate::net::types::{Credentials, UserProfile};

/// What a form should do once a session operation resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormOutcome {
    Navigate(&'static str),
    ShowError(String),
    /// The session moved on or another submit is running; leave the form alone.
    Ignore,
}

pub(crate) fn form_outcome(result: &Result<UserProfile, ApiError>, success_route: &'static str) -> FormOutcome {
    match result {
        Ok(_) => FormOutcome::Navigate(success_route),
        Err(ApiError::Superseded | ApiError::Busy) => FormOutcome::Ignore,
        Err(e) => FormOutcome::ShowError(e.to_string()),
    }
}

/// One form's submit, tracked across the lifetime of its view.
///
/// A form torn down while its submit is pending invalidates the store, and
/// the outcome that eventually arrives is dropped instead of navigating or
/// writing into a disposed view.
#[derive(Clone, Debug, Default)]
pub(crate) struct Submission {
    pending: Arc<AtomicBool>,
    disposed: Arc<AtomicBool>,
}

#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
impl Submission {
    pub(crate) fn start(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    /// Settle the pending submit; `Ignore` once the form is gone.
    pub(crate) fn settle(&self, result: &Result<UserProfile, ApiError>, success_route: &'static str) -> FormOutcome {
        self.pending.store(false, Ordering::SeqCst);
        if self.disposed.load(Ordering::SeqCst) {
            log::debug!("form torn down; dropping submit outcome");
            return FormOutcome::Ignore;
        }
        form_outcome(result, success_route)
    }

    /// Mark the form torn down. Returns whether a submit was still pending.
    pub(crate) fn dispose(&self) -> bool {
        self.disposed.store(true, Ordering::SeqCst);
        self.pending.load(Ordering::SeqCst)
    }
}

/// Form-local error first, then whatever the store last recorded.
pub(crate) fn visible_error(form_error: Option<String>, session_error: Option<String>) -> Option<String> {
    form_error.or(session_error).filter(|m| !m.is_empty())
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let Ok(ctx) = use_session() else {
        return view! { <p class="auth-message">"Session unavailable."</p> }.into_any();
    };
    let session = ctx.session;
    let store = ctx.store;
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
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
        let credentials = Credentials { username: username.get_untracked(), password: password.get_untracked() };

        #[cfg(feature = "hydrate")]
        {
            let store = store.clone();
            let navigate = navigate.clone();
            let submission = submission.clone();
            submission.start();
            leptos::task::spawn_local(async move {
                let result = store.login(credentials).await;
                match submission.settle(&result, "/") {
                    FormOutcome::Navigate(route) => navigate(route, NavigateOptions::default()),
                    FormOutcome::ShowError(message) => form_error.set(Some(message)),
                    FormOutcome::Ignore => {}
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (credentials, &navigate, &submission);
        }
    };

    let busy = move || session.get().is_loading();
    let message = move || visible_error(form_error.get(), session.get().error_message);

    view! {
        <Navbar/>
        <div class="auth-page">
            <div class="auth-card">
                <h2>"Log In"</h2>
                <Show when=move || message().is_some()>
                    <p class="auth-message auth-message--error">{move || message().unwrap_or_default()}</p>
                </Show>
                <form class="auth-form" on:submit=on_submit>
                    <label for="username">"Username"</label>
                    <input
                        id="username"
                        type="text"
                        placeholder="Enter your username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                        disabled=busy
                    />
                    <label for="password">"Password"</label>
                    <input
                        id="password"
                        type="password"
                        placeholder="Enter your password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                        disabled=busy
                    />
                    <button class="auth-button" type="submit" disabled=busy>
                        {move || if busy() { "Logging in..." } else { "Log In" }}
                    </button>
                </form>
                <p class="auth-card__footer">
                    "Don't have an account? "
                    <a href="/register">"Register"</a>
                </p>
            </div>
        </div>
    }
    .into_any()
}
