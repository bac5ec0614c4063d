//! Wire DTOs for the auth-service HTTP boundary.
//!
//! DESIGN
//! ======
//! Field names follow the backend's snake_case JSON. Response types are lenient
//! (numeric or string ids, missing optional fields) so a profile never fails to
//! hydrate over cosmetic schema drift.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Role assigned when the backend omits one.
pub const DEFAULT_ROLE: &str = "user";

/// Authenticated user as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier (string or numeric on the wire).
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    /// Creation timestamp as sent by the backend (RFC 3339).
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl UserProfile {
    /// Name shown in the navigation bar.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() { "User" } else { &self.username }
    }

    /// First and last name joined, or `None` when both are blank.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() { None } else { Some(parts.join(" ")) }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role.eq_ignore_ascii_case(role)
    }
}

/// `POST /auth/login` body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// `POST /auth/register` body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Success body of login and register.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Success body of `GET /users/userinfo`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

/// Success body of `GET /health`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub env: Option<String>,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_owned()
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}
