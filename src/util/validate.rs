//! Input gates applied before any auth request leaves the browser.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use crate::net::types::{Credentials, Registration};

pub const MIN_PASSWORD_LEN: usize = 8;

pub const LOGIN_REQUIRED_MESSAGE: &str = "Username and password are required";
pub const REGISTER_REQUIRED_MESSAGE: &str = "Username, email and password are required";
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email address";
pub const SHORT_PASSWORD_MESSAGE: &str = "Password must be at least 8 characters long";

/// Both login fields must be non-empty.
///
/// # Errors
///
/// Returns the user-facing message for the first failed rule.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), &'static str> {
    if credentials.username.is_empty() || credentials.password.is_empty() {
        return Err(LOGIN_REQUIRED_MESSAGE);
    }
    Ok(())
}

/// Required fields, a structurally valid email, and a minimum password length.
///
/// # Errors
///
/// Returns the user-facing message for the first failed rule.
pub fn validate_registration(data: &Registration) -> Result<(), &'static str> {
    if data.username.is_empty() || data.email.is_empty() || data.password.is_empty() {
        return Err(REGISTER_REQUIRED_MESSAGE);
    }
    if !is_plausible_email(&data.email) {
        return Err(INVALID_EMAIL_MESSAGE);
    }
    if data.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SHORT_PASSWORD_MESSAGE);
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
