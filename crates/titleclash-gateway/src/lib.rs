// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the TitleClash API.
//!
//! Runs the [`RequestRouter`](titleclash_router::RequestRouter) as axum
//! middleware in front of a stand-in dispatcher, behind a per-client
//! fixed-window rate limiter. Routing outcomes travel downstream as the
//! `x-model-override` and `x-routing-note` request headers.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routing;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use rate_limit::{FixedWindowLimiter, RateLimitStatus};
pub use server::{GatewayState, HealthState, build_app, start_server};
