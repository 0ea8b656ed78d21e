//! API route definitions.

use super::state::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/incidents", get(get_incidents))
        .route("/incidents/status", get(incidents_status))
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

/// Serve the most recently cached aggregate verbatim. On a cold start (no
/// cache entry yet) a run is performed synchronously instead of returning
/// empty data.
async fn get_incidents(State(state): State<AppState>) -> Response {
    if let Some(body) = state.cache.body().await {
        return cached_json(body);
    }

    // Cold start: take the run guard, then re-check in case a refresh
    // finished while we waited for it.
    let _guard = state.run_guard.lock().await;
    if let Some(body) = state.cache.body().await {
        return cached_json(body);
    }

    let report = match state.pipeline.run().await {
        Ok(report) => report,
        Err(e) => return service_unavailable(format!("aggregation run failed: {e}")),
    };
    if let Err(e) = state.cache.store(&report).await {
        return service_unavailable(format!("failed to serialize aggregate: {e}"));
    }
    match state.cache.body().await {
        Some(body) => cached_json(body),
        None => service_unavailable("aggregate missing after refresh".to_string()),
    }
}

/// Last run's diagnostics: run id, refresh time, degraded categories, and
/// the unresolved-identity count.
async fn incidents_status(State(state): State<AppState>) -> Response {
    match state.cache.summary().await {
        Some(summary) => Json(json!({ "data": summary })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "data": null, "meta": { "message": "no completed run yet" } })),
        )
            .into_response(),
    }
}

fn cached_json(body: Arc<str>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        body.as_ref().to_owned(),
    )
        .into_response()
}

fn service_unavailable(message: String) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": message })),
    )
        .into_response()
}
