// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the TitleClash routing gateway.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostic rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use titleclash_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("heavy model: {}", config.routing.heavy_model);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, ConfigSource, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ClashConfig, QuotaWindow, RateLimitConfig, RoutingConfig, ServerConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to miette diagnostics with typo suggestions
pub fn load_and_validate() -> Result<ClashConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources(&loader::search_paths());
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<ClashConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources(&[path.to_path_buf()]);
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<ClashConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![ConfigSource {
                name: "<inline>".to_string(),
                text: toml_content.to_string(),
            }];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read TOML source files for error span resolution.
///
/// Paths are resolved the same way figment resolves them so the error
/// metadata matches.
fn collect_toml_sources(paths: &[std::path::PathBuf]) -> Vec<ConfigSource> {
    paths
        .iter()
        .filter_map(|path| {
            let text = std::fs::read_to_string(path).ok()?;
            let resolved = if path.is_relative() {
                std::env::current_dir()
                    .map(|d| d.join(path))
                    .unwrap_or_else(|_| path.clone())
            } else {
                path.clone()
            };
            Some(ConfigSource {
                name: resolved.display().to_string(),
                text,
            })
        })
        .collect()
}
