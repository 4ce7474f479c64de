use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};

use leasegate_core::{
    AcquireRequest, AcquireResponse, LockBackend, LockName, RecordSnapshot, ReleaseRequest,
    ReleaseResponse, RenewRequest, RenewResponse,
};

use super::AppState;
use super::schemas::ErrorResponse;
use crate::error::ServerError;

/// `POST /v1/locks/{name}/acquire` -- one acquisition attempt.
#[utoipa::path(
    post,
    path = "/v1/locks/{name}/acquire",
    tag = "Locks",
    summary = "Try to acquire a lock",
    description = "Takes the lock for the given lease if it is free, cleared, expired, or already held by the same lease. Never waits.",
    params(("name" = String, Path, description = "Lock name")),
    request_body = AcquireRequest,
    responses(
        (status = 200, description = "Acquired, or held by another lease", body = AcquireResponse),
        (status = 400, description = "Invalid name, lease id, or ttl", body = ErrorResponse),
        (status = 503, description = "Gave up after repeated CAS conflicts", body = ErrorResponse),
        (status = 500, description = "Lock store failure", body = ErrorResponse)
    )
)]
pub async fn acquire(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<AcquireRequest>, JsonRejection>,
) -> Result<Json<AcquireResponse>, ServerError> {
    let Json(req) = body?;
    let name = LockName::from(name);
    let ttl = Duration::from_millis(req.ttl_ms);

    let backend = Arc::clone(&state.backend);
    let lock = name.clone();
    let response = state
        .replayed(&name, req.request_id.as_deref(), async move {
            backend
                .try_acquire(&lock, &req.lease_id, &req.acquirer_id, ttl)
                .await
        })
        .await?;
    Ok(Json(response))
}

/// `POST /v1/locks/{name}/renew` -- push a held lease's expiry forward.
#[utoipa::path(
    post,
    path = "/v1/locks/{name}/renew",
    tag = "Locks",
    summary = "Renew a lease",
    description = "Extends the lease to now + ttl if the given lease still holds the lock, otherwise answers not_owner.",
    params(("name" = String, Path, description = "Lock name")),
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Renewed, or not the owner", body = RenewResponse),
        (status = 400, description = "Invalid name, lease id, or ttl", body = ErrorResponse),
        (status = 503, description = "Gave up after repeated CAS conflicts", body = ErrorResponse),
        (status = 500, description = "Lock store failure", body = ErrorResponse)
    )
)]
pub async fn renew(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<RenewRequest>, JsonRejection>,
) -> Result<Json<RenewResponse>, ServerError> {
    let Json(req) = body?;
    let name = LockName::from(name);
    let ttl = Duration::from_millis(req.ttl_ms);

    let backend = Arc::clone(&state.backend);
    let lock = name.clone();
    let response = state
        .replayed(&name, req.request_id.as_deref(), async move {
            backend.try_renew(&lock, &req.lease_id, ttl).await
        })
        .await?;
    Ok(Json(response))
}

/// `POST /v1/locks/{name}/release` -- clear the lock if the lease holds it.
#[utoipa::path(
    post,
    path = "/v1/locks/{name}/release",
    tag = "Locks",
    summary = "Release a lock",
    description = "Clears the lock if the given lease holds it. Releasing twice answers not_owner, never an error.",
    params(("name" = String, Path, description = "Lock name")),
    request_body = ReleaseRequest,
    responses(
        (status = 200, description = "Released, or not the owner", body = ReleaseResponse),
        (status = 400, description = "Invalid name or lease id", body = ErrorResponse),
        (status = 503, description = "Gave up after repeated CAS conflicts", body = ErrorResponse),
        (status = 500, description = "Lock store failure", body = ErrorResponse)
    )
)]
pub async fn release(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<ReleaseRequest>, JsonRejection>,
) -> Result<Json<ReleaseResponse>, ServerError> {
    let Json(req) = body?;
    let name = LockName::from(name);

    let backend = Arc::clone(&state.backend);
    let lock = name.clone();
    let response = state
        .replayed(&name, req.request_id.as_deref(), async move {
            backend.try_release(&lock, &req.lease_id).await
        })
        .await?;
    Ok(Json(response))
}

/// `GET /v1/locks/{name}` -- current record of one lock.
#[utoipa::path(
    get,
    path = "/v1/locks/{name}",
    tag = "Locks",
    summary = "Inspect a lock",
    params(("name" = String, Path, description = "Lock name")),
    responses(
        (status = 200, description = "Current lock record", body = RecordSnapshot),
        (status = 404, description = "Lock was never taken", body = ErrorResponse),
        (status = 400, description = "Invalid lock name", body = ErrorResponse)
    )
)]
pub async fn get_lock(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RecordSnapshot>, ServerError> {
    let name = LockName::from(name);
    state
        .backend
        .inspect(&name)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(name.to_string()))
}

/// `GET /v1/locks` -- every lock ever taken, sorted by name.
#[utoipa::path(
    get,
    path = "/v1/locks",
    tag = "Locks",
    summary = "List locks",
    responses(
        (status = 200, description = "All lock records", body = Vec<RecordSnapshot>),
        (status = 500, description = "Lock store failure", body = ErrorResponse)
    )
)]
pub async fn list_locks(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecordSnapshot>>, ServerError> {
    Ok(Json(state.backend.list().await?))
}
