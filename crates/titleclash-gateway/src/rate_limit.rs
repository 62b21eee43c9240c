// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window rate limiting.
//!
//! Each key (normally the client IP) gets a counter that starts with its
//! first request and expires `window` later. Counters live in memory only.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use titleclash_config::RateLimitConfig;
use titleclash_core::Clock;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Expired windows are swept once the map holds more keys than this, at
/// most once per window length.
const PRUNE_THRESHOLD: usize = 10_000;

/// Longest accepted window; keeps timestamp arithmetic in range.
const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Key used when the client address is unknown.
pub const ANONYMOUS_KEY: &str = "anonymous";

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the key's window ends (rounded up).
    pub reset_after_secs: u64,
}

/// In-memory per-key fixed-window counter.
pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: u32,
    clock: Arc<dyn Clock>,
    windows: DashMap<String, Window>,
    prune_threshold: usize,
    last_prune: Mutex<Option<DateTime<Utc>>>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            max_requests,
            clock,
            windows: DashMap::new(),
            prune_threshold: PRUNE_THRESHOLD,
            last_prune: Mutex::new(None),
        }
    }

    /// Override the key count above which expired windows are swept.
    pub fn with_prune_threshold(mut self, threshold: usize) -> Self {
        self.prune_threshold = threshold;
        self
    }

    /// Build a limiter from config, or `None` when rate limiting is disabled.
    pub fn from_config(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let secs = config.window_secs.min(MAX_WINDOW_SECS) as i64;
        Some(Self::new(Duration::seconds(secs), config.max_requests, clock))
    }

    /// Count one request for `key` and report whether it is allowed.
    pub fn check(&self, key: &str) -> RateLimitStatus {
        let now = self.clock.now();
        if self.windows.len() > self.prune_threshold {
            self.prune_if_due(now);
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });
        if now - entry.started_at >= self.window {
            *entry = Window {
                started_at: now,
                count: 0,
            };
        }

        let allowed = entry.count < self.max_requests;
        if allowed {
            entry.count += 1;
        }

        let ends_in = entry.started_at + self.window - now;
        let reset_after_secs =
            u64::try_from(ends_in.num_milliseconds().max(0)).unwrap_or(0).div_ceil(1000);

        RateLimitStatus {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
            reset_after_secs,
        }
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Sweep unless another sweep ran within the last window or is running now.
    ///
    /// A map that stays above the threshold with mostly live keys would
    /// otherwise be scanned on every request.
    fn prune_if_due(&self, now: DateTime<Utc>) {
        let Ok(mut last) = self.last_prune.try_lock() else {
            return;
        };
        if last.is_some_and(|at| now - at < self.window) {
            return;
        }
        *last = Some(now);
        self.prune(now);
    }

    /// Drop every window that has already ended.
    pub fn prune(&self, now: DateTime<Utc>) {
        let before = self.windows.len();
        self.windows.retain(|_, w| now - w.started_at < self.window);
        tracing::debug!(
            removed = before.saturating_sub(self.windows.len()),
            "pruned expired rate-limit windows"
        );
    }
}

/// Identify the client: peer address, then first `x-forwarded-for` hop.
pub fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| ANONYMOUS_KEY.to_string(), str::to_string)
}

/// Middleware enforcing the gateway's fixed-window limit.
///
/// Passes straight through when no limiter is configured. Both allowed and
/// rejected responses carry `RateLimit-*` headers.
pub async fn rate_limit_middleware(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(limiter) = state.limiter.as_ref() else {
        return next.run(request).await;
    };

    let key = client_key(&request);
    let status = limiter.check(&key);

    let mut response = if status.allowed {
        next.run(request).await
    } else {
        tracing::debug!(key = key.as_str(), "rate limit exceeded");
        let mut response = ApiError::rate_limited().into_response();
        response
            .headers_mut()
            .insert("retry-after", HeaderValue::from(status.reset_after_secs));
        response
    };

    apply_headers(response.headers_mut(), &status);
    response
}

fn apply_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    headers.insert("ratelimit-limit", HeaderValue::from(status.limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(status.remaining));
    headers.insert("ratelimit-reset", HeaderValue::from(status.reset_after_secs));
}
