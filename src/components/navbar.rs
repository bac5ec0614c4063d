//! Top navigation bar with identity and logout.

use leptos::prelude::*;

use crate::app::use_session;
use crate::state::session::Session;

fn welcome_text(session: &Session) -> String {
    let name = session.user.as_ref().map_or("User", |u| u.display_name());
    format!("Welcome, {name}")
}

#[component]
pub fn Navbar() -> impl IntoView {
    let Ok(ctx) = use_session() else {
        return ().into_any();
    };
    let session = ctx.session;
    let store = ctx.store;

    let links = move || {
        if session.get().is_authenticated() {
            let store = store.clone();
            view! {
                <div class="navbar__links">
                    <a href="/dashboard">"Dashboard"</a>
                    <a href="/profile">"Profile"</a>
                </div>
                <div class="navbar__account">
                    <span class="navbar__welcome">{move || welcome_text(&session.get())}</span>
                    <button class="navbar__logout" on:click=move |_| store.logout()>
                        "Logout"
                    </button>
                </div>
            }
            .into_any()
        } else {
            view! {
                <div class="navbar__account">
                    <a href="/login">"Login"</a>
                    <a href="/register" class="navbar__cta">"Register"</a>
                </div>
            }
            .into_any()
        }
    };

    view! {
        <nav class="navbar">
            <a href="/" class="navbar__brand">"Auth Service"</a>
            {links}
        </nav>
    }
    .into_any()
}
