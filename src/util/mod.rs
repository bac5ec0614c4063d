//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Policy and input checks live here so pages and components stay thin and the
//! rules stay testable without a browser.

pub mod auth;
pub mod validate;
