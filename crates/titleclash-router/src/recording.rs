// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any installed recorder (Prometheus or
//! otherwise) collects these; with no recorder they are no-ops.

use metrics::{describe_counter, describe_gauge};

use crate::router::ReasonCode;

/// Register routing metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "titleclash_routing_decisions_total",
        "Routing decisions by reason code"
    );
    describe_gauge!(
        "titleclash_heavy_quota_used",
        "Heavy approvals in the current quota window"
    );
}

/// Record one routing decision.
pub fn record_decision(reason: ReasonCode) {
    let reason: &'static str = reason.into();
    metrics::counter!("titleclash_routing_decisions_total", "reason" => reason).increment(1);
}

/// Publish the current heavy quota usage.
pub fn set_heavy_quota_used(used: u32) {
    metrics::gauge!("titleclash_heavy_quota_used").set(f64::from(used));
}
