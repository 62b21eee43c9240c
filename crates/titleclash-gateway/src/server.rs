// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use titleclash_config::{ClashConfig, ServerConfig};
use titleclash_core::{Clock, ClashError};
use titleclash_router::RequestRouter;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::rate_limit::{FixedWindowLimiter, rate_limit_middleware};
use crate::routing::model_routing_middleware;

/// Health state for the unlimited health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl HealthState {
    pub fn new(prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            prometheus_render,
        }
    }
}

/// Shared state for axum middleware and handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Model router shared by every request.
    pub router: Arc<RequestRouter>,
    /// Fixed-window limiter (None = rate limiting disabled).
    pub limiter: Option<Arc<FixedWindowLimiter>>,
    /// Largest body the routing middleware buffers.
    pub max_body_bytes: usize,
    /// Health state for unlimited endpoints.
    pub health: HealthState,
}

impl GatewayState {
    /// Build router, quota, and limiter from a validated config.
    pub fn from_config(
        config: &ClashConfig,
        clock: Arc<dyn Clock>,
        prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
    ) -> Self {
        let router = RequestRouter::from_config(&config.routing, Arc::clone(&clock));
        let limiter = FixedWindowLimiter::from_config(&config.rate_limit, clock).map(Arc::new);
        Self {
            router: Arc::new(router),
            limiter,
            max_body_bytes: config.server.max_body_bytes,
            health: HealthState::new(prometheus_render),
        }
    }
}

/// Assemble the gateway application.
///
/// - GET /health, GET /metrics: no rate limit, no routing
/// - GET /v1/routing/quota: rate limited
/// - POST /api/{*rest}: rate limited, then model routing
/// - other methods on /api/{*rest}: JSON 405, never routed
///
/// The limiter sits outside the router so rejected requests never spend
/// heavy quota.
pub fn build_app(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .with_state(state.clone());

    let status_routes = Router::new()
        .route("/v1/routing/quota", get(handlers::get_quota))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state.clone());

    // Layers go on the method router so an unsupported method falls through
    // to the 405 handler without being routed or spending quota.
    let dispatch = post(handlers::dispatch)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            model_routing_middleware,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .fallback(handlers::method_not_allowed);

    let api_routes = Router::new()
        .route("/api/{*rest}", dispatch)
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(status_routes)
        .merge(api_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Serves until `cancel` fires, then drains in-flight requests.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), ClashError> {
    let app = build_app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ClashError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { cancel.cancelled().await })
    .await
    .map_err(|e| ClashError::Server {
        message: format!("gateway server error: {e}"),
        source: Some(Box::new(e)),
    })?;

    tracing::info!("gateway stopped");
    Ok(())
}
