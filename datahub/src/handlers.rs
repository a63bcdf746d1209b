//! HTTP handlers for the data service

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use datahub_core::{ApiError, ErrorCode};
use datahub_storage::StorageError;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::router::AppState;

/// Service name reported by `/health`
pub const SERVICE_NAME: &str = "data-analytics-service";

const JSON_CONTENT_TYPE: &str = "application/json";

// === Health ===

pub async fn health_check() -> Response {
    json_response(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "timestamp": Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            "service": SERVICE_NAME,
        }),
    )
}

/// Probe the store with a bucket listing.
pub async fn storage_health(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_buckets().await {
        Ok(_) => {
            if !state.bucket.is_ready() {
                state.bucket.ensure_best_effort().await;
            }

            json_response(
                StatusCode::OK,
                &json!({
                    "status": "healthy",
                    "storage": "connected",
                    "endpoint": state.endpoint,
                    "bucket": state.bucket.name(),
                    "bucket_ready": state.bucket.is_ready(),
                }),
            )
        }
        Err(e) => {
            warn!(endpoint = %state.endpoint, error = %e, "Storage health check failed");
            json_response(
                status_of(ErrorCode::StorageUnavailable),
                &json!({
                    "status": "unhealthy",
                    "storage": "disconnected",
                    "error": e.to_string(),
                }),
            )
        }
    }
}

// === Data ===

pub async fn upload_data(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    if body.iter().all(u8::is_ascii_whitespace) {
        return error_response(&ApiError::no_data());
    }

    let data: Value = match serde_json::from_slice(&body) {
        Ok(data) => data,
        Err(e) => return error_response(&ApiError::invalid_payload(e)),
    };

    if is_empty_payload(&data) {
        return error_response(&ApiError::no_data());
    }

    let filename = upload_key(Utc::now());
    let payload = match serde_json::to_vec(&data) {
        Ok(payload) => Bytes::from(payload),
        Err(e) => return storage_failure(&e),
    };

    match state
        .store
        .put_object(state.bucket.name(), &filename, payload, JSON_CONTENT_TYPE)
        .await
    {
        Ok(()) => {
            info!(filename = %filename, bucket = %state.bucket.name(), "Stored upload");
            json_response(
                StatusCode::CREATED,
                &json!({
                    "message": "Data uploaded successfully",
                    "filename": filename,
                    "bucket": state.bucket.name(),
                }),
            )
        }
        Err(e) => storage_failure(&e),
    }
}

pub async fn list_data(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_objects(state.bucket.name()).await {
        Ok(objects) => {
            let files: Vec<Value> = objects
                .iter()
                .map(|obj| {
                    json!({
                        "filename": obj.key,
                        "size": obj.size,
                        "last_modified": obj.last_modified.map(format_last_modified),
                    })
                })
                .collect();

            json_response(
                StatusCode::OK,
                &json!({
                    "bucket": state.bucket.name(),
                    "count": files.len(),
                    "files": files,
                }),
            )
        }
        Err(e) => storage_failure(&e),
    }
}

pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    match state.store.get_object(state.bucket.name(), &filename).await {
        Ok(body) => match serde_json::from_slice::<Value>(&body) {
            Ok(data) => json_response(
                StatusCode::OK,
                &json!({
                    "filename": filename,
                    "data": data,
                }),
            ),
            Err(e) => storage_failure(&e),
        },
        Err(StorageError::ObjectNotFound { .. }) => error_response(&ApiError::file_not_found()),
        Err(e) => storage_failure(&e),
    }
}

/// Deleting a key that does not exist still reports success.
pub async fn delete_data(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    match state
        .store
        .delete_object(state.bucket.name(), &filename)
        .await
    {
        Ok(()) => {
            info!(filename = %filename, "Deleted object");
            json_response(
                StatusCode::OK,
                &json!({
                    "message": "File deleted successfully",
                    "filename": filename,
                }),
            )
        }
        Err(e) => storage_failure(&e),
    }
}

// === Misc ===

pub async fn index() -> Response {
    json_response(
        StatusCode::OK,
        &json!({
            "service": "Data Analytics Hub - S3 Data Service",
            "version": "1.0.0",
            "endpoints": {
                "health": "/health",
                "storage_health": "/storage/health",
                "upload_data": "POST /data",
                "list_data": "GET /data",
                "get_data": "GET /data/<filename>",
                "delete_data": "DELETE /data/<filename>",
            },
        }),
    )
}

pub async fn not_found() -> Response {
    error_response(&ApiError::route_not_found())
}

// === Helpers ===

/// Object key for an upload received at `now`
pub fn upload_key(now: DateTime<Utc>) -> String {
    format!("data_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// JSON values that count as "no data": null, false, 0, "", [] and {}
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// ISO 8601 with `+00:00`; fractional seconds, when present, always get six digits.
fn format_last_modified(ts: DateTime<Utc>) -> String {
    let precision = if ts.timestamp_subsec_micros() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    ts.to_rfc3339_opts(precision, false)
}

fn json_response(status: StatusCode, body: &Value) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn status_of(code: ErrorCode) -> StatusCode {
    StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn error_response(err: &ApiError) -> Response {
    Response::builder()
        .status(status_of(err.code))
        .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Body::from(err.to_json()))
        .unwrap()
}

fn storage_failure(cause: &dyn std::fmt::Display) -> Response {
    error!(error = %cause, "Storage request failed");
    error_response(&ApiError::storage(cause))
}
