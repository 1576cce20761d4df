//! Authentication payloads
//! Mirrors the identity service's token and registration endpoints

use crate::models::user::SessionUser;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login credentials. Ephemeral; never persisted beyond the login call.
pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Secret::new(password.into()),
        }
    }
}

/// Access/refresh token pair.
///
/// Always replaced as a unit; a refresh without rotation keeps the old
/// refresh token but still writes both together.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

// Tokens are credentials, keep them out of debug output
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Response of the token and registration endpoints
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub user: SessionUser,
}

/// Response of the token refresh endpoint.
///
/// `refresh` is only present when the identity service rotates refresh
/// tokens.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Registration request.
///
/// Validated locally before any network call: password length and the
/// mirrored confirmation field.
#[derive(Debug, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords don't match."))]
    pub password_confirm: String,

    #[validate(length(min = 1, message = "First name is required."))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required."))]
    pub last_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}
