#![allow(clippy::needless_for_each)]

use leasegate_core::{
    AcquireOutcome, AcquireRequest, AcquireResponse, RecordSnapshot, ReleaseOutcome,
    ReleaseRequest, ReleaseResponse, RenewOutcome, RenewRequest, RenewResponse,
};

use super::schemas::{ErrorResponse, HealthResponse};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Leasegate Lock Authority API",
        version = "0.1.0",
        description = "HTTP API for the Leasegate lock authority. Acquire, renew, and release time-bounded leases on named locks.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Locks", description = "Lease operations on named locks")
    ),
    paths(
        super::health::health,
        super::locks::acquire,
        super::locks::renew,
        super::locks::release,
        super::locks::get_lock,
        super::locks::list_locks,
    ),
    components(schemas(
        AcquireRequest,
        AcquireResponse,
        AcquireOutcome,
        RenewRequest,
        RenewResponse,
        RenewOutcome,
        ReleaseRequest,
        ReleaseResponse,
        ReleaseOutcome,
        RecordSnapshot,
        HealthResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDoc;
