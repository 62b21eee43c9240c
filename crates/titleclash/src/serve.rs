// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `titleclash serve` implementation.
//!
//! Initializes tracing and metrics, builds the router and gateway state, and
//! serves until SIGINT or SIGTERM.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use titleclash_config::ClashConfig;
use titleclash_core::{ClashError, SystemClock};
use titleclash_gateway::{GatewayState, start_server};
use tracing::info;

use crate::shutdown;

/// Render function handed to the gateway's `/metrics` handler.
type MetricsRender = Arc<dyn Fn() -> String + Send + Sync>;

/// Run the gateway until a shutdown signal arrives.
pub async fn run_serve(config: ClashConfig) -> Result<(), ClashError> {
    init_tracing(&config.log.level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting titleclash gateway");

    let prometheus_render = if config.server.metrics_enabled {
        Some(install_metrics()?)
    } else {
        None
    };

    let state = GatewayState::from_config(&config, Arc::new(SystemClock), prometheus_render);
    info!(
        heavy_model = config.routing.heavy_model.as_str(),
        fallback_model = config.routing.fallback_model.as_str(),
        max_tokens = config.routing.max_tokens,
        daily_quota = state.router.quota().limit(),
        quota_window = ?config.routing.quota_window,
        rate_limit = state.limiter.is_some(),
        "model routing configured"
    );

    let cancel = shutdown::install_signal_handler();
    start_server(&config.server, state, cancel).await
}

/// Install the global Prometheus recorder and describe routing metrics.
fn install_metrics() -> Result<MetricsRender, ClashError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        ClashError::Internal(format!("failed to install Prometheus recorder: {e}"))
    })?;

    titleclash_router::recording::register_metrics();
    info!("prometheus metrics recorder installed");

    Ok(Arc::new(move || handle.render()))
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `titleclash={log_level},warn`. Output
/// goes to stderr so command output on stdout stays machine-readable.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("titleclash={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
