use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{NewVacation, ReviewDecision, Vacation};
use crate::services::api_client::{segment, ApiClient};

pub const VACATIONS_PATH: &str = "/api/ferias";

/// Vacation request endpoints. Authorization is enforced by the backend.
#[derive(Clone)]
pub struct VacationService {
    api: Arc<ApiClient>,
}

impl VacationService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn create(&self, request: &NewVacation) -> Result<Vacation, ApiError> {
        let created: Vacation = self
            .api
            .post(VACATIONS_PATH, serde_json::json!(request))
            .await?;

        tracing::info!(vacation_id = %created.id, "Vacation request created");
        Ok(created)
    }

    /// Requests owned by the logged-in user.
    pub async fn list_mine(&self) -> Result<Vec<Vacation>, ApiError> {
        self.api.get(&format!("{}/minhas", VACATIONS_PATH)).await
    }

    /// Every request in the system (admin).
    pub async fn list_all(&self) -> Result<Vec<Vacation>, ApiError> {
        self.api.get(&format!("{}/admin", VACATIONS_PATH)).await
    }

    pub async fn update_status(&self, id: &str, decision: ReviewDecision) -> Result<Vacation, ApiError> {
        let path = format!("{}/{}/status", VACATIONS_PATH, segment(id));
        let updated: Vacation = self
            .api
            .patch(&path, Some(serde_json::json!({ "status": decision })))
            .await?;

        tracing::info!(vacation_id = %updated.id, status = %updated.status, "Vacation request reviewed");
        Ok(updated)
    }

    /// Withdraw one of the caller's own pending requests.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api
            .delete(&format!("{}/{}", VACATIONS_PATH, segment(id)))
            .await?;

        tracing::info!(vacation_id = %id, "Vacation request deleted");
        Ok(())
    }

    /// Admin removal of any request. Same endpoint; the backend decides
    /// based on the caller's role.
    pub async fn delete_any(&self, id: &str) -> Result<(), ApiError> {
        self.api
            .delete(&format!("{}/{}", VACATIONS_PATH, segment(id)))
            .await?;

        tracing::info!(vacation_id = %id, admin = true, "Vacation request deleted by admin");
        Ok(())
    }
}
