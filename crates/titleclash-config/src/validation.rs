// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as bind addresses, header-safe model identifiers, and route prefixes.

use crate::diagnostic::ConfigError;
use crate::model::ClashConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ClashConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.max_body_bytes == 0 {
        fail("server.max_body_bytes must be greater than 0".to_string());
    }

    if config.routing.max_tokens == 0 {
        fail("routing.max_tokens must be greater than 0".to_string());
    }

    for (key, model) in [
        ("routing.heavy_model", &config.routing.heavy_model),
        ("routing.fallback_model", &config.routing.fallback_model),
    ] {
        if model.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        } else if !model.chars().all(|c| c.is_ascii_graphic()) {
            // Sent verbatim as the x-model-override header value.
            fail(format!(
                "{key} `{}` must be printable ASCII with no spaces or control characters",
                model.escape_debug()
            ));
        }
    }

    for (i, prefix) in config.routing.heavy_route_prefixes.iter().enumerate() {
        if !prefix.starts_with('/') {
            fail(format!(
                "routing.heavy_route_prefixes[{i}] `{prefix}` must start with `/`"
            ));
        } else if prefix == "/" {
            // "/" would classify every request as heavy.
            fail(format!(
                "routing.heavy_route_prefixes[{i}] must be more specific than `/`"
            ));
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.window_secs == 0 {
            fail("rate_limit.window_secs must be greater than 0".to_string());
        }
        if config.rate_limit.max_requests == 0 {
            fail("rate_limit.max_requests must be greater than 0".to_string());
        }
    }

    let level = config.log.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "log.level `{}` must be one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ClashConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_host_fails_validation() {
        let mut config = ClashConfig::default();
        config.server.host = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "server.host"));
    }

    #[test]
    fn garbage_host_fails_validation() {
        let mut config = ClashConfig::default();
        config.server.host = "local host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "not a valid IP address"));
    }

    #[test]
    fn zero_max_tokens_fails_validation() {
        let mut config = ClashConfig::default();
        config.routing.max_tokens = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "routing.max_tokens"));
    }

    #[test]
    fn empty_model_names_fail_validation() {
        let mut config = ClashConfig::default();
        config.routing.heavy_model = String::new();
        config.routing.fallback_model = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "routing.heavy_model"));
        assert!(has_error(&errors, "routing.fallback_model"));
    }

    #[test]
    fn model_names_must_be_header_safe() {
        let mut config = ClashConfig::default();
        config.routing.heavy_model = "vendor/\u{7}bad".to_string();
        config.routing.fallback_model = "vendor/small model".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "routing.heavy_model `vendor/\\u{7}bad`"));
        assert!(has_error(&errors, "routing.fallback_model"));

        config.routing.fallback_model = "vendor/modèle".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "routing.fallback_model"));

        config.routing.heavy_model = "anthropic/claude-opus-4.1".to_string();
        config.routing.fallback_model = "github-copilot/gpt-5-mini".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn bad_route_prefixes_fail_validation() {
        let mut config = ClashConfig::default();
        config.routing.heavy_route_prefixes = vec!["api/research".to_string(), "/".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "heavy_route_prefixes[0]"));
        assert!(has_error(&errors, "heavy_route_prefixes[1]"));
    }

    #[test]
    fn zero_rate_limit_fails_only_when_enabled() {
        let mut config = ClashConfig::default();
        config.rate_limit.window_secs = 0;
        config.rate_limit.max_requests = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "rate_limit.window_secs"));
        assert!(has_error(&errors, "rate_limit.max_requests"));

        config.rate_limit.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = ClashConfig::default();
        config.log.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "log.level"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = ClashConfig::default();
        config.server.max_body_bytes = 0;
        config.routing.max_tokens = 0;
        config.log.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
