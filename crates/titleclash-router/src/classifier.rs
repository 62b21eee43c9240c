// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heavy-candidate classification and input cost estimation.
//!
//! Both are zero-cost heuristics: a prefix match on the path, an explicit
//! priority flag, and a UTF-16-units-divided-by-four token estimate. No
//! tokenizer, no network.

use serde_json::Value;

/// Value of the header or body `priority` field that requests heavy routing.
pub const HEAVY_PRIORITY: &str = "heavy";

/// Body fields searched for input text, in priority order.
const TEXT_FIELDS: &[&str] = &["prompt", "text", "query"];

/// Transport-agnostic view of an inbound request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteInput<'a> {
    /// Target path, e.g. `/api/research/run`.
    pub path: &'a str,
    /// Value of the `x-priority` header, if present and valid UTF-8.
    pub priority_header: Option<&'a str>,
    /// Parsed JSON body, if the request carried one.
    pub body: Option<&'a Value>,
}

impl<'a> RouteInput<'a> {
    /// Input for a bodiless request to `path`.
    pub fn new(path: &'a str) -> Self {
        Self {
            path,
            priority_header: None,
            body: None,
        }
    }

    /// Set the `x-priority` header value.
    pub fn with_priority_header(mut self, value: &'a str) -> Self {
        self.priority_header = Some(value);
        self
    }

    /// Attach a parsed JSON body.
    pub fn with_body(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Why a request was considered a heavy candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeavySignal {
    /// The path matched a heavy-route prefix.
    Route,
    /// The `x-priority` header was `heavy`.
    Header,
    /// The body `priority` field was `heavy`.
    Body,
}

/// Decides heavy candidacy from path prefixes and explicit priority flags.
#[derive(Debug, Clone)]
pub struct HeavyClassifier {
    route_prefixes: Vec<String>,
}

impl HeavyClassifier {
    /// Create a classifier for the given heavy-route prefixes.
    pub fn new(route_prefixes: Vec<String>) -> Self {
        Self { route_prefixes }
    }

    /// Heavy-route prefixes this classifier matches.
    pub fn route_prefixes(&self) -> &[String] {
        &self.route_prefixes
    }

    /// Returns the first heavy signal found, or `None` for a light request.
    ///
    /// Route prefixes are checked before the header, and the header before
    /// the body; any one of them is sufficient.
    pub fn heavy_signal(&self, input: &RouteInput<'_>) -> Option<HeavySignal> {
        if self
            .route_prefixes
            .iter()
            .any(|prefix| input.path.starts_with(prefix.as_str()))
        {
            return Some(HeavySignal::Route);
        }

        if input.priority_header == Some(HEAVY_PRIORITY) {
            return Some(HeavySignal::Header);
        }

        let body_priority = input
            .body
            .and_then(|b| b.get("priority"))
            .and_then(Value::as_str);
        if body_priority == Some(HEAVY_PRIORITY) {
            return Some(HeavySignal::Body);
        }

        None
    }
}

/// Extract the input text from a request body.
///
/// Returns the first non-empty string among `prompt`, `text`, `query`. A
/// missing body, a non-object body, or non-string fields yield `""`.
pub fn extract_text(body: Option<&Value>) -> &str {
    let Some(Value::Object(map)) = body else {
        return "";
    };
    TEXT_FIELDS
        .iter()
        .filter_map(|field| map.get(*field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// Estimate token cost as `ceil(len / 4)`.
///
/// `len` is measured in UTF-16 code units, so a character outside the Basic
/// Multilingual Plane (most emoji) counts as two.
pub fn estimate_tokens(text: &str) -> u32 {
    let units = text.encode_utf16().count();
    u32::try_from(units.div_ceil(4)).unwrap_or(u32::MAX)
}
