// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `titleclash route`: one-shot routing dry run.
//!
//! Runs a single request through a fresh router (empty quota, system clock)
//! and reports the decision. Nothing is dispatched.

use std::sync::Arc;

use serde_json::Value;
use titleclash_config::ClashConfig;
use titleclash_core::{ClashError, SystemClock};
use titleclash_router::{RequestRouter, RouteInput, RoutingDecision};

/// Route one request described on the command line.
///
/// Unlike the gateway, a `--body` that is not valid JSON is an error here.
pub fn dry_run(
    config: &ClashConfig,
    path: &str,
    priority: Option<&str>,
    body: Option<&str>,
) -> Result<RoutingDecision, ClashError> {
    let body: Option<Value> = body
        .map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(|e| ClashError::InvalidInput(format!("--body is not valid JSON: {e}")))?;

    let router = RequestRouter::from_config(&config.routing, Arc::new(SystemClock));

    let mut input = RouteInput::new(path);
    if let Some(priority) = priority {
        input = input.with_priority_header(priority);
    }
    if let Some(body) = body.as_ref() {
        input = input.with_body(body);
    }
    Ok(router.route(&input))
}

/// Pretty-print a decision as JSON.
pub fn render(decision: &RoutingDecision) -> Result<String, ClashError> {
    serde_json::to_string_pretty(decision)
        .map_err(|e| ClashError::Internal(format!("failed to serialize decision: {e}")))
}
