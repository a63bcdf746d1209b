//! HTTP router for the data service

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use datahub_core::{RequestId, REQUEST_ID_HEADER};
use datahub_storage::{EphemeralStore, ObjectStore, S3Settings, S3Store};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::bucket::BucketInitializer;
use crate::config::{StorageBackend, StorageConfig};
use crate::handlers;

/// Shared state handed to every handler
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub bucket: BucketInitializer,
    /// Endpoint as configured, reported by `/storage/health`
    pub endpoint: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            bucket: BucketInitializer::new(store.clone(), bucket),
            store,
            endpoint: endpoint.into(),
        }
    }

    /// Build the store selected by `config` and wrap it in state.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let store: Arc<dyn ObjectStore> = match config.backend {
            StorageBackend::S3 => Arc::new(
                S3Store::connect(&S3Settings {
                    endpoint_url: config.endpoint_url(),
                    access_key: config.access_key.clone(),
                    secret_key: config.secret_key.clone(),
                    region: config.region.clone(),
                })
                .await,
            ),
            StorageBackend::Memory => Arc::new(EphemeralStore::new()),
        };

        let endpoint = match config.backend {
            StorageBackend::S3 => config.endpoint.clone(),
            StorageBackend::Memory => "memory".to_string(),
        };

        Self::new(store, config.bucket.clone(), endpoint)
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    let data_routes = Router::new()
        .route(
            "/data",
            get(handlers::list_data).post(handlers::upload_data),
        )
        .route(
            "/data/:filename",
            get(handlers::get_data).delete(handlers::delete_data),
        )
        .route_layer(middleware::from_fn_with_state(
            shared_state.clone(),
            ensure_bucket,
        ))
        // Uploads are not size-limited
        .layer(DefaultBodyLimit::disable());

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/storage/health", get(handlers::storage_health))
        .merge(data_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(middleware::from_fn(assign_request_id))
        .with_state(shared_state)
}

/// Retry bucket setup in front of data routes until it has succeeded once.
async fn ensure_bucket(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    if !state.bucket.is_ready() {
        state.bucket.ensure_best_effort().await;
    }
    next.run(request).await
}

async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn make_span(request: &Request) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(ToString::to_string)
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
