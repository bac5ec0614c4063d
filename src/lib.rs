//! # authgate
//!
//! Leptos + WASM browser client for a remote authentication service.
//!
//! The core is the session lifecycle: `net::api` talks to the auth endpoints,
//! `state::store` owns the session and its persisted token, and `util::auth`
//! gates protected routes. Pages and components are thin views over that core.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install browser logging and hydrate the app.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
