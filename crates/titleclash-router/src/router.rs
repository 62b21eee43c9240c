// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heavy/light request routing with a daily heavy quota.
//!
//! Orchestrates model selection: classify heavy candidacy > estimate cost >
//! quota and size gate > attach decision. The router never rejects a request;
//! every outcome is a model choice plus a reason code.

use std::sync::Arc;

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};
use titleclash_config::RoutingConfig;
use titleclash_core::Clock;
use tracing::debug;

use crate::classifier::{HeavyClassifier, RouteInput, estimate_tokens, extract_text};
use crate::quota::{HeavyQuota, QuotaOutcome};
use crate::recording;

/// Workload class assigned to a request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Heavy candidate (by route or explicit flag), whether or not approved.
    Heavy,
    /// Everything else.
    Light,
}

/// Why the router picked the model it did.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Heavy candidate approved; quota consumed.
    RoutedHeavy,
    /// Heavy candidate denied because the daily quota is spent.
    QuotaExceededFallback,
    /// Heavy candidate denied because the input is over the token ceiling.
    TokensTooLargeFallback,
    /// Not a heavy candidate.
    RoutedDefault,
}

/// Per-request routing outcome, consumed by the downstream dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    /// Workload class.
    pub classification: Classification,
    /// Model identifier for downstream dispatch.
    pub selected_model: String,
    /// Reason code, also written to the `x-routing-note` header.
    pub reason: ReasonCode,
    /// Estimated input tokens that were evaluated.
    pub estimated_tokens: u32,
}

/// Classifies requests and gates heavy routing on quota and input size.
pub struct RequestRouter {
    classifier: HeavyClassifier,
    quota: Arc<HeavyQuota>,
    max_tokens: u32,
    heavy_model: String,
    fallback_model: String,
}

impl RequestRouter {
    /// Create a router sharing an existing quota.
    pub fn new(config: &RoutingConfig, quota: Arc<HeavyQuota>) -> Self {
        Self {
            classifier: HeavyClassifier::new(config.heavy_route_prefixes.clone()),
            quota,
            max_tokens: config.max_tokens,
            heavy_model: config.heavy_model.clone(),
            fallback_model: config.fallback_model.clone(),
        }
    }

    /// Create a router with its own quota at the fixed daily limit.
    pub fn from_config(config: &RoutingConfig, clock: Arc<dyn Clock>) -> Self {
        let quota = HeavyQuota::new(clock).with_window(config.quota_window);
        Self::new(config, Arc::new(quota))
    }

    /// The quota this router spends.
    pub fn quota(&self) -> &Arc<HeavyQuota> {
        &self.quota
    }

    /// Route one request.
    ///
    /// Non-candidates always get the fallback model. Candidates get the heavy
    /// model unless the quota is spent (checked first) or the estimated input
    /// exceeds `max_tokens`; only an approval consumes quota.
    pub fn route(&self, input: &RouteInput<'_>) -> RoutingDecision {
        let estimated_tokens = estimate_tokens(extract_text(input.body));
        let signal = self.classifier.heavy_signal(input);

        let decision = match signal {
            None => self.fallback(Classification::Light, ReasonCode::RoutedDefault, estimated_tokens),
            Some(_) => match self.quota.try_acquire(estimated_tokens <= self.max_tokens) {
                QuotaOutcome::Approved { used } => {
                    recording::set_heavy_quota_used(used);
                    RoutingDecision {
                        classification: Classification::Heavy,
                        selected_model: self.heavy_model.clone(),
                        reason: ReasonCode::RoutedHeavy,
                        estimated_tokens,
                    }
                }
                QuotaOutcome::Exhausted => self.fallback(
                    Classification::Heavy,
                    ReasonCode::QuotaExceededFallback,
                    estimated_tokens,
                ),
                QuotaOutcome::TooLarge => self.fallback(
                    Classification::Heavy,
                    ReasonCode::TokensTooLargeFallback,
                    estimated_tokens,
                ),
            },
        };

        debug!(
            path = input.path,
            signal = ?signal,
            reason = %decision.reason,
            model = decision.selected_model.as_str(),
            estimated_tokens,
            "routing decision"
        );
        recording::record_decision(decision.reason);

        decision
    }

    fn fallback(
        &self,
        classification: Classification,
        reason: ReasonCode,
        estimated_tokens: u32,
    ) -> RoutingDecision {
        RoutingDecision {
            classification,
            selected_model: self.fallback_model.clone(),
            reason,
            estimated_tokens,
        }
    }
}
