//! Session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by route guards and user-aware components to coordinate login
//! redirects and identity-dependent rendering. Only the store mutates it.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::types::UserProfile;

/// Lifecycle phase of the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// Startup, before `initialize` has run.
    #[default]
    Uninitialized,
    /// An initialize, login or register call is in flight.
    Loading,
    Authenticated,
    Anonymous,
}

impl SessionStatus {
    /// Whether the outcome of the current phase is not yet known.
    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }
}

/// Authentication state tracking the current user, token and last error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub status: SessionStatus,
    pub error_message: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    /// `status == Authenticated` exactly when a user is present.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.is_authenticated() == self.user.is_some()
    }

    pub(crate) fn begin(&mut self) {
        self.status = SessionStatus::Loading;
        self.error_message = None;
    }

    pub(crate) fn authenticate(&mut self, token: String, user: UserProfile) {
        self.token = Some(token);
        self.user = Some(user);
        self.status = SessionStatus::Authenticated;
        self.error_message = None;
    }

    pub(crate) fn sign_out(&mut self) {
        self.token = None;
        self.user = None;
        self.status = SessionStatus::Anonymous;
        self.error_message = None;
    }

    /// Resolve a failed attempt, keeping whatever identity was held before it.
    pub(crate) fn fail(&mut self, message: String) {
        self.status = if self.user.is_some() { SessionStatus::Authenticated } else { SessionStatus::Anonymous };
        self.error_message = Some(message);
    }
}
