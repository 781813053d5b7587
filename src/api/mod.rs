use axum::{Router, http::HeaderValue, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ApiConfig, Config};
use crate::models::service::ServicesPage;
use crate::services::{CatalogService, MemoryCache, RetryPolicy};
use crate::state::SharedState;

mod error;
mod health;
mod observability;
pub mod services;
mod types;
mod validation;

pub use error::ApiError;
pub use services::ListServicesQuery;
pub use types::*;

pub struct AppState {
    pub shared: Arc<SharedState>,

    /// HTTP settings captured at start-up.
    pub api: ApiConfig,

    pub retry: RetryPolicy,

    /// Serialized-query response cache; its entries also back the stale
    /// fallback of the list endpoint.
    pub responses: MemoryCache<Arc<ServicesPage>>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<dyn CatalogService> {
        Arc::clone(&self.shared.catalog)
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let config = shared.config.read().await.clone();
    let api = config.api.clone();

    let responses = MemoryCache::new(
        "http_responses",
        Duration::from_secs(api.cache_ttl_seconds),
        config.cache.max_entries,
    );

    Ok(Arc::new(AppState {
        shared,
        retry: api.retry_policy(),
        api,
        responses,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().read().await.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/services", get(services::list_services))
        .route("/services/{id}", get(services::get_service))
        .route("/services/{id}/related", get(services::get_related_services))
        .route("/categories", get(services::list_categories))
        .route("/health", get(health::get_health));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(observability::track_requests))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
