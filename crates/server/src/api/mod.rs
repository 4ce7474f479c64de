pub mod health;
pub mod locks;
pub mod openapi;
pub mod schemas;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use leasegate_backend::OptimisticLockingBackend;
use leasegate_core::{BackendError, LockName};
use leasegate_store::LockRecordStore;
use leasegate_store_memory::MemoryLockStore;

use crate::config::LeasegateConfig;
use crate::replay::{ReplayCache, Replayable};

use self::openapi::ApiDoc;

/// The lock authority served over HTTP.
pub type LockAuthority = OptimisticLockingBackend<Arc<dyn LockRecordStore>>;

/// Shared application state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<LockAuthority>,
    /// `None` when replay is disabled.
    pub replay: Option<ReplayCache>,
}

impl AppState {
    /// Build state over an in-memory store, tuned by `config`.
    pub fn in_memory(config: &LeasegateConfig) -> Self {
        let store: Arc<dyn LockRecordStore> = Arc::new(MemoryLockStore::new());
        Self::with_store(store, config)
    }

    /// Build state over an arbitrary lock record store.
    pub fn with_store(store: Arc<dyn LockRecordStore>, config: &LeasegateConfig) -> Self {
        let backend =
            OptimisticLockingBackend::new(store).with_config(config.locks.backend_config());
        Self {
            backend: Arc::new(backend),
            replay: ReplayCache::from_config(&config.replay),
        }
    }

    /// Run `op`, deduplicating through the replay cache when the request
    /// carries a `request_id`.
    async fn replayed<T, F>(
        &self,
        name: &LockName,
        request_id: Option<&str>,
        op: F,
    ) -> Result<T, BackendError>
    where
        T: Replayable,
        F: Future<Output = Result<T, BackendError>>,
    {
        match (&self.replay, request_id) {
            (Some(cache), Some(id)) => cache.get_or_run(name, id, op).await,
            _ => op.await,
        }
    }
}

/// Build the axum router with all API routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/v1/locks", get(locks::list_locks))
        .route("/v1/locks/{name}", get(locks::get_lock))
        .route("/v1/locks/{name}/acquire", post(locks::acquire))
        .route("/v1/locks/{name}/renew", post(locks::renew))
        .route("/v1/locks/{name}/release", post(locks::release))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
