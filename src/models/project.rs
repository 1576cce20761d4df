//! Project domain models
//! DTOs for the projects resource API; escrow/budget/milestone fields
//! are plain data, the client enforces nothing about them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project as returned by the list and detail endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub project_number: String,
    pub title: String,
    pub description: String,
    pub project_type: String,
    pub status: String,
    pub priority: String,

    // Location
    pub country: String,
    pub city: String,

    // Budget fields (no client-side enforcement)
    pub total_budget: String,
    pub budget_currency: String,
    #[serde(default)]
    pub budget_remaining: Option<String>,

    #[serde(default)]
    pub completion_percentage: Option<u8>,
    #[serde(default)]
    pub planned_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub planned_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub days_remaining: Option<i64>,
    #[serde(default)]
    pub is_overdue: Option<bool>,

    #[serde(default)]
    pub owner_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create project request
#[derive(Debug, Default, Serialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub project_type: String,
    pub priority: String,
    pub country: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub budget_currency: String,
    pub total_budget: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub allow_inspector_applications: bool,
}

/// Partial project update (PATCH)
#[derive(Debug, Default, Serialize)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<NaiveDate>,
}

/// Project milestone
#[derive(Debug, Clone, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_amount: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create milestone request
#[derive(Debug, Serialize)]
pub struct CreateMilestoneRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<String>,
}

/// Post a progress update against a project
#[derive(Debug, Serialize)]
pub struct CreateProjectUpdateRequest {
    pub title: String,
    pub content: String,
    pub update_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
}

/// Progress update posted against a project
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectUpdateEntry {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub update_type: String,
    #[serde(default)]
    pub progress_percentage: Option<u8>,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
