//! Normalized error taxonomy for auth-service calls and session operations.
//!
//! ERROR HANDLING
//! ==============
//! The gateway never recovers locally; every failure is classified here and
//! propagated. The `Display` output of `Auth`/`Server` is the server-provided
//! message so it can be shown to the user verbatim.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Message used when a failed response carries no `error` field.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The request could not complete (connectivity failure or timeout).
    #[error("Unable to reach the authentication service")]
    Network { detail: String },

    /// Credentials or token rejected (401/403).
    #[error("{message}")]
    Auth { status: u16, message: String, body: serde_json::Value },

    /// Any other non-success status.
    #[error("{message}")]
    Server { status: u16, message: String, body: serde_json::Value },

    /// A mutating session operation is already in flight.
    #[error("another session operation is already in progress")]
    Busy,

    /// The session moved on (logout or teardown) before this call resolved.
    #[error("session changed before the request completed")]
    Superseded,

    /// The session context was used before it was provided.
    #[error("session store is not initialized")]
    NotInitialized,
}

impl ApiError {
    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network { detail: detail.into() }
    }

    /// Build the error for a non-success HTTP status from the raw body text.
    ///
    /// The body is parsed as JSON when possible; its `error` field becomes the
    /// message, falling back to [`DEFAULT_ERROR_MESSAGE`].
    #[must_use]
    pub fn from_status(status: u16, raw_body: &str) -> Self {
        let body = serde_json::from_str::<serde_json::Value>(raw_body).unwrap_or(serde_json::Value::Null);
        let message = body
            .get("error")
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
            .to_owned();
        match status {
            401 | 403 => Self::Auth { status, message, body },
            _ => Self::Server { status, message, body },
        }
    }

    /// HTTP status carried by the error, if it came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}
