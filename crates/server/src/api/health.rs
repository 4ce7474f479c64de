use axum::Json;
use axum::extract::State;

use super::AppState;
use super::schemas::HealthResponse;
use crate::error::ServerError;

/// `GET /health` -- returns service status and the number of held locks.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    description = "Returns service status and the number of locks currently held.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 500, description = "Lock store unavailable", body = super::schemas::ErrorResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ServerError> {
    let held = state
        .backend
        .list()
        .await?
        .iter()
        .filter(|record| record.held)
        .count();

    Ok(Json(HealthResponse {
        status: "ok".into(),
        locks: held,
    }))
}
