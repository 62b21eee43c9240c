// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heavy/light model routing for the TitleClash API.
//!
//! This crate provides:
//! - [`HeavyClassifier`]: route-prefix and priority-flag heavy candidacy
//! - [`HeavyQuota`]: thread-safe daily cap on heavy approvals
//! - [`RequestRouter`]: quota- and size-gated model selection
//!
//! The router sits in front of downstream model dispatch. It tags each
//! request with a model override and a reason code and never rejects.

pub mod classifier;
pub mod quota;
pub mod recording;
pub mod router;

pub use classifier::{HeavyClassifier, HeavySignal, RouteInput, estimate_tokens, extract_text};
pub use quota::{HeavyQuota, QuotaOutcome, QuotaSnapshot};
pub use router::{Classification, ReasonCode, RequestRouter, RoutingDecision};
