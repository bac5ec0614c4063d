//! Client-side session state.
//!
//! DESIGN
//! ======
//! `session` is the plain data model, `token_store` the durable token slot, and
//! `store` the single writer that moves the session through its lifecycle.

pub mod session;
pub mod store;
pub mod token_store;
