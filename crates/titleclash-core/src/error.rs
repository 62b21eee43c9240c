// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the TitleClash routing gateway.

use thiserror::Error;

/// The primary error type for fallible TitleClash plumbing.
///
/// Routing itself never fails; these variants cover configuration,
/// listener setup, and server lifecycle.
#[derive(Debug, Error)]
pub enum ClashError {
    /// Configuration errors (invalid TOML, unknown keys, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to bind the HTTP listener.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// The HTTP server stopped with an error.
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Caller-supplied input that cannot be used (e.g. a malformed body).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
