//! Route guard policy for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected route applies the same three-way decision: wait while the
//! session is unresolved, redirect when anonymous, render when authenticated.
//! The decision is re-evaluated on every session change, so signing out while
//! a protected view is mounted redirects immediately.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::session::Session;

pub const LOGIN_ROUTE: &str = "/login";
pub const FORBIDDEN_FALLBACK_ROUTE: &str = "/dashboard";

/// What a protected route should do for the current session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session unresolved: neutral placeholder, no redirect.
    Placeholder,
    /// Show the protected subtree.
    Render,
    /// Leave for the given route; render nothing protected.
    Redirect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardPolicy {
    pub login_route: String,
    /// Role the user must hold; `None` admits any authenticated user.
    pub required_role: Option<String>,
    /// Where authenticated users lacking `required_role` are sent.
    pub forbidden_route: String,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            login_route: LOGIN_ROUTE.to_owned(),
            required_role: None,
            forbidden_route: FORBIDDEN_FALLBACK_ROUTE.to_owned(),
        }
    }
}

impl GuardPolicy {
    #[must_use]
    pub fn require_role(role: impl Into<String>) -> Self {
        Self { required_role: Some(role.into()), ..Self::default() }
    }
}

#[must_use]
pub fn decide(session: &Session, policy: &GuardPolicy) -> GuardDecision {
    if session.status.is_pending() {
        return GuardDecision::Placeholder;
    }
    match (session.is_authenticated(), &session.user, &policy.required_role) {
        (true, Some(user), Some(role)) if !user.has_role(role) => GuardDecision::Redirect(policy.forbidden_route.clone()),
        (true, Some(_), _) => GuardDecision::Render,
        // Anonymous, or authenticated without a user (never produced by the store).
        _ => GuardDecision::Redirect(policy.login_route.clone()),
    }
}

/// Navigate away whenever the guard decision for `session` becomes a redirect.
pub fn install_guard_redirect<F>(session: RwSignal<Session>, policy: GuardPolicy, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if let GuardDecision::Redirect(route) = decide(&session.get(), &policy) {
            navigate(&route, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}
