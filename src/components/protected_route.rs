//! Route wrapper that only renders its children for an authenticated session.
//!
//! SYSTEM CONTEXT
//! ==============
//! While the session is unresolved a neutral placeholder is shown and no
//! redirect happens, so a returning user never sees a flash of the login page.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::app::use_session;
use crate::util::auth::{GuardDecision, GuardPolicy, decide, install_guard_redirect};

#[component]
pub fn ProtectedRoute(
    children: ChildrenFn,
    /// Role required to view the children, e.g. `"admin"`.
    #[prop(optional, into)]
    role: Option<String>,
) -> impl IntoView {
    let ctx = match use_session() {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("ProtectedRoute: {e}");
            return view! { <div class="guard guard--error">"Session unavailable."</div> }.into_any();
        }
    };
    let session = ctx.session;
    let policy = role.map_or_else(GuardPolicy::default, GuardPolicy::require_role);
    install_guard_redirect(session, policy.clone(), use_navigate());

    (move || match decide(&session.get(), &policy) {
        GuardDecision::Placeholder => view! {
            <div class="guard guard--loading">
                <p>"Loading..."</p>
            </div>
        }
        .into_any(),
        GuardDecision::Render => children().into_any(),
        GuardDecision::Redirect(_) => ().into_any(),
    })
    .into_any()
}
