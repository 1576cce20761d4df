//! Inspectors resource API

use crate::error::Result;
use crate::models::inspector::{Inspector, UpdateInspectorProfileRequest};
use crate::session::SessionManager;
use std::sync::Arc;
use uuid::Uuid;

/// Client for the inspectors directory endpoints.
pub struct InspectorsApi {
    session: Arc<SessionManager>,
}

impl InspectorsApi {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// List inspectors in the directory
    pub async fn list(&self) -> Result<Vec<Inspector>> {
        self.session.get("/inspectors/").await
    }

    pub async fn get(&self, inspector_id: Uuid) -> Result<Inspector> {
        self.session
            .get(&format!("/inspectors/{}/", inspector_id))
            .await
    }

    /// Current inspector's own profile
    pub async fn my_profile(&self) -> Result<Inspector> {
        self.session.get("/inspectors/profile/").await
    }

    pub async fn update_my_profile(
        &self,
        request: &UpdateInspectorProfileRequest,
    ) -> Result<Inspector> {
        self.session.patch("/inspectors/profile/", request).await
    }
}
