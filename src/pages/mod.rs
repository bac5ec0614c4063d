//! Routed page modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `login` and `register` drive session store operations from forms.
//! `dashboard` and `profile` sit behind `ProtectedRoute` and only read the
//! current session.

pub mod dashboard;
pub mod login;
pub mod profile;
pub mod register;
