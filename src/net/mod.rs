//! Networking modules for the auth-service HTTP boundary.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` performs the round trips, `error` normalizes failures, and `types`
//! defines the wire schema.

pub mod api;
pub mod error;
pub mod types;
