//! Inspector domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inspector as listed in the directory
#[derive(Debug, Clone, Deserialize)]
pub struct Inspector {
    pub id: Uuid,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,

    pub country: String,
    pub city: String,

    // Verification fields (data only, no KYC workflow in the client)
    pub verification_level: String,
    #[serde(default)]
    pub is_available: bool,

    #[serde(default)]
    pub years_of_experience: Option<u32>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub completed_inspections: Option<u32>,

    pub created_at: DateTime<Utc>,
}

/// Inspector's own profile update (PATCH /inspectors/profile/)
#[derive(Debug, Default, Serialize)]
pub struct UpdateInspectorProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}
