// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config errors as miette diagnostics.
//!
//! Unknown keys and badly typed values are pointed at in the TOML file that
//! set them. Unknown keys also get the list of keys their section accepts
//! and, when one is close enough, a "did you mean" hint.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Lowest Jaro-Winkler score that still counts as a likely typo.
const TYPO_SIMILARITY: f64 = 0.75;

/// Keys accepted in each config section. The empty section is the file root.
const SECTION_KEYS: &[(&str, &[&str])] = &[
    ("", &["server", "routing", "rate_limit", "log"]),
    ("server", &["host", "port", "max_body_bytes", "metrics_enabled"]),
    (
        "routing",
        &[
            "max_tokens",
            "heavy_model",
            "fallback_model",
            "heavy_route_prefixes",
            "quota_window",
        ],
    ),
    ("rate_limit", &["enabled", "window_secs", "max_requests"]),
    ("log", &["level"]),
];

/// A TOML document that fed the config, kept for pointing at bad keys.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path as figment reports it, or a placeholder for inline strings.
    pub name: String,
    pub text: String,
}

/// Why a config could not be loaded.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(.section))]
    #[diagnostic(
        code(titleclash::config::unknown_key),
        help("{}", unknown_key_help(section, suggestion.as_deref()))
    )]
    UnknownKey {
        key: String,
        /// Section the key was found in; empty for the file root.
        section: String,
        /// Closest accepted key, if any is a plausible typo.
        suggestion: Option<String>,
        #[label("not accepted in this section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(titleclash::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `server.port`.
        key: String,
        found: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value parsed but is out of range or otherwise unusable.
    #[error("invalid config: {message}")]
    #[diagnostic(code(titleclash::config::validation))]
    Validation { message: String },

    #[error("config error: {0}")]
    #[diagnostic(code(titleclash::config::other))]
    Other(String),
}

fn section_label(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(section: &str, suggestion: Option<&str>) -> String {
    let accepted = section_keys(section)
        .map(|keys| keys.join(", "))
        .unwrap_or_default();
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {} accepts: {accepted}", section_label(section)),
        None => format!("{} accepts: {accepted}", section_label(section)),
    }
}

/// Keys a section accepts, or `None` for a section that does not exist.
pub fn section_keys(section: &str) -> Option<&'static [&'static str]> {
    SECTION_KEYS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| *keys)
}

/// Split a figment error into one diagnostic per underlying failure.
pub fn figment_to_config_errors(err: figment::Error, sources: &[ConfigSource]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let source = source_for(&error, sources);
            match &error.kind {
                Kind::UnknownField(key, _) => {
                    let section = error.path.join(".");
                    let suggestion = section_keys(&section).and_then(|keys| closest_key(key, keys));
                    let (span, src) = pinpoint(source, &section, key);
                    ConfigError::UnknownKey {
                        key: key.clone(),
                        section,
                        suggestion,
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) => {
                    let (section, key) = match error.path.split_last() {
                        Some((key, parents)) => (parents.join("."), key.as_str()),
                        None => (String::new(), ""),
                    };
                    let (span, src) = pinpoint(source, &section, key);
                    ConfigError::InvalidType {
                        key: error.path.join("."),
                        found: found.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// The source document an error came from.
///
/// Inline strings carry no file path; they resolve only when they are the
/// sole source.
fn source_for<'a>(error: &figment::Error, sources: &'a [ConfigSource]) -> Option<&'a ConfigSource> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    match file {
        Some(name) => sources.iter().find(|s| s.name == name),
        None if sources.len() == 1 => sources.first(),
        None => None,
    }
}

fn pinpoint(
    source: Option<&ConfigSource>,
    section: &str,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some(source) = source else {
        return (None, None);
    };
    match locate_key(&source.text, section, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(&source.name, source.text.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `key = ...` inside `[section]` (or before any header when
/// `section` is empty).
///
/// Walks the document line by line, tracking the current table header, so a
/// key of the same name in another section is never matched.
pub fn locate_key(text: &str, section: &str, key: &str) -> Option<usize> {
    if key.is_empty() {
        return None;
    }
    let mut current = "";
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if let Some(header) = trimmed.strip_prefix('[') {
            current = header
                .split(']')
                .next()
                .map(str::trim)
                .unwrap_or_default();
        } else if current == section {
            if let Some(after) = trimmed.strip_prefix(key) {
                if after.trim_start().starts_with('=') {
                    return Some(offset + indent);
                }
            }
        }
        offset += line.len();
    }
    None
}

/// The accepted key most similar to `unknown`, if it is a plausible typo.
pub fn closest_key(unknown: &str, accepted: &[&str]) -> Option<String> {
    accepted
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > TYPO_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print each error to stderr with miette's graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClashConfig;

    #[test]
    fn section_table_matches_config_model() {
        let defaults = serde_json::to_value(ClashConfig::default()).unwrap();
        let root = defaults.as_object().unwrap();
        let mut sections: Vec<&str> = root.keys().map(String::as_str).collect();
        sections.sort_unstable();
        let mut listed = section_keys("").unwrap().to_vec();
        listed.sort_unstable();
        assert_eq!(sections, listed);

        for (name, fields) in root {
            let mut actual: Vec<&str> = fields
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();
            actual.sort_unstable();
            let mut listed = section_keys(name).unwrap().to_vec();
            listed.sort_unstable();
            assert_eq!(actual, listed, "keys of [{name}]");
        }
    }

    #[test]
    fn typo_suggestions() {
        let routing = section_keys("routing").unwrap();
        assert_eq!(closest_key("max_tokns", routing).as_deref(), Some("max_tokens"));
        assert_eq!(closest_key("heavy_modle", routing).as_deref(), Some("heavy_model"));
        assert_eq!(closest_key("zzzzzz", section_keys("server").unwrap()), None);
    }

    #[test]
    fn help_names_section_and_suggestion() {
        let help = unknown_key_help("rate_limit", Some("window_secs"));
        assert!(help.starts_with("did you mean `window_secs`?"));
        assert!(help.contains("[rate_limit] accepts: enabled, window_secs, max_requests"));
        assert!(unknown_key_help("", None).starts_with("the top level accepts: server"));
    }

    #[test]
    fn locate_key_respects_section() {
        let text = "[server]\nport = 80\n\n[ routing ]\nport = 1\nmax_tokns= 10\n";
        let o = locate_key(text, "routing", "port").unwrap();
        assert_eq!(o, text.rfind("port = 1").unwrap());
        let o = locate_key(text, "routing", "max_tokns").unwrap();
        assert_eq!(&text[o..o + 9], "max_tokns");
    }

    #[test]
    fn locate_key_ignores_prefix_collisions_and_crlf() {
        let text = "[log]\r\nlevel_x = 1\r\n  level = \"debug\"\r\n";
        let o = locate_key(text, "log", "level").unwrap();
        assert_eq!(o, text.find("level =").unwrap());
    }

    #[test]
    fn locate_key_top_level_and_missing() {
        let text = "serverx = 1\n[server]\nport = 80\n";
        assert_eq!(locate_key(text, "", "serverx"), Some(0));
        assert_eq!(locate_key(text, "routing", "port"), None);
        assert_eq!(locate_key(text, "server", ""), None);
    }

    #[test]
    fn invalid_type_points_at_the_value_key() {
        let text = "[routing]\nmax_tokens = \"lots\"\n";
        let err = crate::loader::load_config_from_str(text).unwrap_err();
        let sources = [ConfigSource {
            name: "<inline>".into(),
            text: text.into(),
        }];
        let errors = figment_to_config_errors(err, &sources);
        match &errors[..] {
            [ConfigError::InvalidType { key, span: Some(span), src: Some(_), .. }] => {
                assert_eq!(key, "routing.max_tokens");
                assert_eq!(span.offset(), text.find("max_tokens").unwrap());
                assert_eq!(span.len(), "max_tokens".len());
            }
            other => panic!("expected a located InvalidType, got {other:?}"),
        }
    }
}
