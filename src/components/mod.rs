//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the shared `SessionContext` and only invoke session store
//! operations; they hold no session state of their own.

pub mod navbar;
pub mod protected_route;
