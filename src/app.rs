//! Root application component with routing and the session context.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store is built exactly once here and handed to components as
//! a `SessionContext`. A reactive mirror of the session (`RwSignal<Session>`)
//! is kept in sync through a store subscription so views re-render on every
//! transition.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::config::AuthConfig;
use crate::net::api::HttpAuthApi;
use crate::net::error::ApiError;
use crate::pages::{dashboard::DashboardPage, login::LoginPage, profile::ProfilePage, register::RegisterPage};
use crate::state::session::Session;
use crate::state::store::SessionStore;
use crate::state::token_store::LocalStorageTokenStore;

/// Session handle provided to every component.
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub store: SessionStore,
    /// Reactive copy of the store's session.
    pub session: RwSignal<Session>,
}

impl SessionContext {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        let session = RwSignal::new(store.snapshot());
        let subscription = store.subscribe(move |next| session.set(next.clone()));
        let handle = store.clone();
        on_cleanup(move || handle.unsubscribe(subscription));
        Self { store, session }
    }
}

/// Fetch the session context provided by [`App`].
///
/// # Errors
///
/// Returns `ApiError::NotInitialized` when called outside the app tree.
pub fn use_session() -> Result<SessionContext, ApiError> {
    use_context::<SessionContext>().ok_or(ApiError::NotInitialized)
}

/// Build the production store: HTTP gateway plus `localStorage` token slot.
#[must_use]
pub fn build_session_store(config: &AuthConfig) -> (SessionStore, Arc<HttpAuthApi>) {
    let api = Arc::new(HttpAuthApi::new(config.clone()));
    let tokens = Arc::new(LocalStorageTokenStore::new(config.token_storage_key.clone()));
    (SessionStore::new(api.clone(), tokens), api)
}

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Builds the session store, starts hydration in the browser, and sets up
/// client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = AuthConfig::from_env().unwrap_or_else(|e| {
        log::warn!("{e}; falling back to default auth config");
        AuthConfig::default()
    });
    let (store, api) = build_session_store(&config);
    provide_context(SessionContext::new(store.clone()));

    #[cfg(feature = "hydrate")]
    {
        leptos::task::spawn_local(async move { store.initialize().await });
        leptos::task::spawn_local(async move {
            match api.health().await {
                Ok(health) => {
                    log::info!("auth service at {} is {} (env {:?})", api.config().api_base_url, health.status, health.env);
                }
                Err(e) => log::warn!("auth service at {} unreachable: {e}", api.config().api_base_url),
            }
        });
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = (store, api);

    view! {
        <Title text="Auth Service"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("register") view=RegisterPage/>
                <Route path=StaticSegment("dashboard") view=DashboardPage/>
                <Route path=StaticSegment("profile") view=ProfilePage/>
                <Route path=StaticSegment("") view=DashboardPage/>
            </Routes>
        </Router>
    }
}
