// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the TitleClash gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level TitleClash configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClashConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Heavy/light model routing settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Fixed-window rate limiting settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest request body the routing middleware will buffer.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Expose Prometheus metrics at `/metrics`.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_metrics_enabled() -> bool {
    true
}

/// How the heavy quota window advances once it expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaWindow {
    /// Reset to the start of the current UTC day (calendar-aligned).
    #[default]
    UtcDay,
    /// Reset to the moment the expiry was observed.
    Rolling,
}

/// Heavy/light model routing configuration.
///
/// The daily heavy quota itself is fixed at
/// [`titleclash_core::DAILY_HEAVY_QUOTA`] and is not configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Upper bound on estimated input tokens for heavy eligibility.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Model assigned to approved heavy requests.
    #[serde(default = "default_heavy_model")]
    pub heavy_model: String,

    /// Model assigned to denied or non-heavy requests.
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Path prefixes that always make a request a heavy candidate.
    #[serde(default = "default_heavy_route_prefixes")]
    pub heavy_route_prefixes: Vec<String>,

    /// Window rollover policy for the heavy quota.
    #[serde(default)]
    pub quota_window: QuotaWindow,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            heavy_model: default_heavy_model(),
            fallback_model: default_fallback_model(),
            heavy_route_prefixes: default_heavy_route_prefixes(),
            quota_window: QuotaWindow::default(),
        }
    }
}

fn default_max_tokens() -> u32 {
    3000
}

fn default_heavy_model() -> String {
    "openai/gpt-5.2".to_string()
}

fn default_fallback_model() -> String {
    "github-copilot/gpt-5-mini".to_string()
}

fn default_heavy_route_prefixes() -> Vec<String> {
    vec!["/api/research".to_string(), "/api/longtask".to_string()]
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Enable the rate limiter.
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Requests allowed per key per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    100
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
