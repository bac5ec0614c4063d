//! Landing page for signed-in users.

use leptos::prelude::*;

use crate::app::use_session;
use crate::components::navbar::Navbar;
use crate::components::protected_route::ProtectedRoute;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let Ok(ctx) = use_session() else {
        return view! { <p class="auth-message">"Session unavailable."</p> }.into_any();
    };
    let session = ctx.session;

    let greeting = move || {
        session
            .get()
            .user
            .map_or_else(|| "Welcome".to_owned(), |u| format!("Welcome back, {}", u.full_name().unwrap_or(u.username)))
    };
    let role = move || session.get().user.map(|u| u.role).unwrap_or_default();

    view! {
        <Navbar/>
        <ProtectedRoute>
            <div class="dashboard">
                <h1>{greeting}</h1>
                <p class="dashboard__role">"Signed in as " <strong>{role}</strong></p>
                <div class="dashboard__cards">
                    <a class="dashboard__card" href="/profile">
                        <h3>"Profile"</h3>
                        <p>"Review your account details."</p>
                    </a>
                </div>
            </div>
        </ProtectedRoute>
    }
    .into_any()
}
