// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model-routing middleware.
//!
//! Buffers the request body, asks the [`RequestRouter`] for a decision, and
//! hands the request on with the decision attached as headers and as an
//! extension. The body is restored unchanged for the downstream handler.
//!
//! [`RequestRouter`]: titleclash_router::RequestRouter

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::Value;
use titleclash_core::{MODEL_OVERRIDE_HEADER, PRIORITY_HEADER, ROUTING_NOTE_HEADER};
use titleclash_router::{RouteInput, RoutingDecision};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Attach a routing decision to every request that reaches it.
///
/// Routing outcomes never reject a request. The only rejections come from
/// buffering the body: larger than `max_body_bytes` is 413, any other read
/// failure is 400.
pub async fn model_routing_middleware(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "failed to buffer request body");
            return body_read_error(&e, state.max_body_bytes).into_response();
        }
    };

    let json = parse_body(&bytes);
    let priority = parts
        .headers
        .get(PRIORITY_HEADER)
        .and_then(|v| v.to_str().ok());

    let mut input = RouteInput::new(parts.uri.path());
    if let Some(priority) = priority {
        input = input.with_priority_header(priority);
    }
    if let Some(json) = json.as_ref() {
        input = input.with_body(json);
    }
    let decision = state.router.route(&input);

    set_routing_headers(&mut parts.headers, &decision);
    parts.extensions.insert(decision);

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Map a buffering failure to 413 when the size limit tripped, else 400.
fn body_read_error(err: &axum::Error, limit: usize) -> ApiError {
    let over_limit = std::iter::successors(Some(err as &(dyn std::error::Error + 'static)), |e| e.source())
        .any(|e| e.is::<LengthLimitError>());
    if over_limit {
        ApiError::payload_too_large(limit)
    } else {
        ApiError::validation("Failed to read request body")
    }
}

/// Lenient JSON parse: empty or malformed bodies count as no body.
fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

fn set_routing_headers(headers: &mut HeaderMap, decision: &RoutingDecision) {
    match HeaderValue::from_str(&decision.selected_model) {
        Ok(model) => {
            headers.insert(MODEL_OVERRIDE_HEADER, model);
        }
        Err(_) => tracing::warn!(
            model = decision.selected_model.as_str(),
            "model name is not a valid header value"
        ),
    }
    let note: &'static str = decision.reason.into();
    headers.insert(ROUTING_NOTE_HEADER, HeaderValue::from_static(note));
}
