//! Projects resource API

use crate::error::Result;
use crate::models::project::{
    CreateMilestoneRequest, CreateProjectRequest, CreateProjectUpdateRequest, Milestone, Project,
    ProjectUpdateEntry, UpdateProjectRequest,
};
use crate::session::SessionManager;
use std::sync::Arc;
use uuid::Uuid;

/// Client for the projects endpoints.
///
/// Plain request/response; no retry or consistency contract beyond the
/// session manager's 401 pipeline.
pub struct ProjectsApi {
    session: Arc<SessionManager>,
}

impl ProjectsApi {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// List projects visible to the current user
    pub async fn list(&self) -> Result<Vec<Project>> {
        self.session.get("/projects/").await
    }

    pub async fn create(&self, request: &CreateProjectRequest) -> Result<Project> {
        self.session.post("/projects/", request).await
    }

    pub async fn get(&self, project_id: Uuid) -> Result<Project> {
        self.session.get(&format!("/projects/{}/", project_id)).await
    }

    pub async fn update(&self, project_id: Uuid, request: &UpdateProjectRequest) -> Result<Project> {
        self.session
            .patch(&format!("/projects/{}/", project_id), request)
            .await
    }

    pub async fn delete(&self, project_id: Uuid) -> Result<()> {
        self.session.delete(&format!("/projects/{}/", project_id)).await
    }

    pub async fn milestones(&self, project_id: Uuid) -> Result<Vec<Milestone>> {
        self.session
            .get(&format!("/projects/{}/milestones/", project_id))
            .await
    }

    pub async fn create_milestone(
        &self,
        project_id: Uuid,
        request: &CreateMilestoneRequest,
    ) -> Result<Milestone> {
        self.session
            .post(&format!("/projects/{}/milestones/", project_id), request)
            .await
    }

    pub async fn updates(&self, project_id: Uuid) -> Result<Vec<ProjectUpdateEntry>> {
        self.session
            .get(&format!("/projects/{}/updates/", project_id))
            .await
    }

    pub async fn post_update(
        &self,
        project_id: Uuid,
        request: &CreateProjectUpdateRequest,
    ) -> Result<ProjectUpdateEntry> {
        self.session
            .post(&format!("/projects/{}/updates/", project_id), request)
            .await
    }
}
