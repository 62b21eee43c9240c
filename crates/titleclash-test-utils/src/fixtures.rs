// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request body builders.

use serde_json::{Value, json};

/// A body whose `prompt` field is exactly `chars` characters long.
pub fn prompt_body(chars: usize) -> Value {
    json!({ "prompt": "a".repeat(chars) })
}

/// A body that explicitly asks for heavy routing.
pub fn heavy_priority_body(prompt: &str) -> Value {
    json!({ "priority": "heavy", "prompt": prompt })
}

/// A body that exceeds the default 3000-token heavy ceiling.
pub fn oversized_body() -> Value {
    prompt_body(3001 * 4)
}
