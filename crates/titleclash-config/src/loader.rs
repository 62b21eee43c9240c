// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./titleclash.toml` > `~/.config/titleclash/titleclash.toml`
//! > `/etc/titleclash/titleclash.toml` with environment variable overrides via
//! the `TITLECLASH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ClashConfig;

/// Config file name searched in every hierarchy directory.
pub const CONFIG_FILE_NAME: &str = "titleclash.toml";

/// Config sections that environment variables can target.
///
/// Ordered longest-first so `rate_limit_` is matched before any shorter prefix.
const ENV_SECTIONS: &[&str] = &["rate_limit", "routing", "server", "log"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/titleclash/titleclash.toml` (system-wide)
/// 3. `~/.config/titleclash/titleclash.toml` (user XDG config)
/// 4. `./titleclash.toml` (local directory)
/// 5. `TITLECLASH_*` environment variables
pub fn load_config() -> Result<ClashConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ClashConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClashConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ClashConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClashConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(ClashConfig::default()));
    for path in search_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Config file locations in merge order (lowest priority first).
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/titleclash").join(CONFIG_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("titleclash").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because both section and key
/// names contain underscores: `TITLECLASH_RATE_LIMIT_MAX_REQUESTS` must map to
/// `rate_limit.max_requests`.
fn env_provider() -> Env {
    Env::prefixed("TITLECLASH_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a prefix-stripped env var name to a dotted config path.
///
/// Figment passes the name in its original case, so matching is done on the
/// lowercased form.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
