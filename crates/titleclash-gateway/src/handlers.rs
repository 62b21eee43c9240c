// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers for the gateway.
//!
//! Handles GET /health, GET /metrics, GET /v1/routing/quota, the
//! POST /api/{*rest} dispatch stand-in, and the 405/404 fallbacks.

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use titleclash_core::{MODEL_OVERRIDE_HEADER, ROUTING_NOTE_HEADER};
use titleclash_router::{Classification, QuotaSnapshot, RoutingDecision};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}

/// Response body for the dispatch stand-in.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    /// Request path as seen by the dispatcher.
    pub path: String,
    /// Value of `x-model-override`.
    pub model: Option<String>,
    /// Value of `x-routing-note`.
    pub routing_note: Option<String>,
    pub classification: Option<Classification>,
    pub estimated_tokens: Option<u32>,
}

/// GET /health
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
///
/// Prometheus text exposition, or 404 when no recorder was installed.
pub async fn get_public_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => ApiError::not_found("metrics are disabled").into_response(),
    }
}

/// GET /v1/routing/quota
pub async fn get_quota(State(state): State<GatewayState>) -> Json<QuotaSnapshot> {
    Json(state.router.quota().snapshot())
}

/// POST /api/{*rest}
///
/// Stands in for downstream model dispatch: echoes the routing metadata the
/// middleware attached.
pub async fn dispatch(
    uri: Uri,
    headers: HeaderMap,
    decision: Option<Extension<RoutingDecision>>,
) -> Json<DispatchResponse> {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let decision = decision.map(|Extension(d)| d);

    Json(DispatchResponse {
        path: uri.path().to_string(),
        model: header_str(MODEL_OVERRIDE_HEADER),
        routing_note: header_str(ROUTING_NOTE_HEADER),
        classification: decision.as_ref().map(|d| d.classification),
        estimated_tokens: decision.as_ref().map(|d| d.estimated_tokens),
    })
}

/// Fallback for unsupported methods on a known route.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(format!("Method {method} not allowed on {}", uri.path()))
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}
