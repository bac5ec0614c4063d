//! Read-only view of the signed-in user's account.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use leptos::prelude::*;

use crate::app::use_session;
use crate::components::navbar::Navbar;
use crate::components::protected_route::ProtectedRoute;
use crate::net::types::UserProfile;

const NOT_SET: &str = "Not set";

/// Label/value pairs shown on the profile card, in display order.
fn profile_rows(user: &UserProfile) -> Vec<(&'static str, String)> {
    vec![
        ("Username", user.username.clone()),
        ("Email", if user.email.is_empty() { NOT_SET.to_owned() } else { user.email.clone() }),
        ("Full name", user.full_name().unwrap_or_else(|| NOT_SET.to_owned())),
        ("Role", user.role.clone()),
        ("Member since", user.created_at.clone().unwrap_or_else(|| NOT_SET.to_owned())),
    ]
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let Ok(ctx) = use_session() else {
        return view! { <p class="auth-message">"Session unavailable."</p> }.into_any();
    };
    let session = ctx.session;

    let rows = move || {
        session
            .get()
            .user
            .map(|u| profile_rows(&u))
            .unwrap_or_default()
            .into_iter()
            .map(|(label, value)| {
                view! {
                    <div class="profile__row">
                        <dt>{label}</dt>
                        <dd>{value}</dd>
                    </div>
                }
            })
            .collect_view()
    };

    view! {
        <Navbar/>
        <ProtectedRoute>
            <div class="profile">
                <h1>"Your Profile"</h1>
                <dl class="profile__details">{rows}</dl>
            </div>
        </ProtectedRoute>
    }
    .into_any()
}
