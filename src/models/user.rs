//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of the authenticated user, as returned by the identity service.
///
/// Held in memory only; reconstructed from the profile endpoint on
/// bootstrap, never persisted on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,

    pub role: UserRole,
    pub status: UserStatus,

    // Verification flags
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub phone_verified: bool,
    #[serde(default)]
    pub is_verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// User role enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Inspector,
    Support,
}

/// Account status enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Pending,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_user_deserialization() {
        let body = json!({
            "id": "6f2c0b9e-4a9d-4d56-9f20-2a2a3c1d9a01",
            "email": "amina@example.com",
            "first_name": "Amina",
            "last_name": "Diallo",
            "phone_number": null,
            "role": "user",
            "status": "active",
            "email_verified": true,
            "phone_verified": false,
            "is_verified": true,
            "created_at": "2025-01-15T10:00:00Z",
            "updated_at": "2025-01-15T10:00:00Z"
        });

        let user: SessionUser = serde_json::from_value(body).unwrap();
        assert_eq!(user.email, "amina@example.com");
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.full_name(), "Amina Diallo");
        assert!(user.is_verified);
    }

    #[test]
    fn test_role_serialization_is_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Inspector).unwrap(), "\"inspector\"");
        assert_eq!(serde_json::to_string(&UserStatus::Pending).unwrap(), "\"pending\"");
    }
}
