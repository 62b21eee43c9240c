// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the TitleClash routing gateway.
//!
//! Holds the error type, the injectable clock, and constants shared by the
//! router and the gateway.

pub mod clock;
pub mod error;

pub use clock::{Clock, SystemClock, start_of_utc_day};
pub use error::ClashError;

/// Maximum heavy approvals per daily window.
pub const DAILY_HEAVY_QUOTA: u32 = 200;

/// Request header carrying the model chosen for downstream dispatch.
pub const MODEL_OVERRIDE_HEADER: &str = "x-model-override";

/// Request header carrying the routing reason code.
pub const ROUTING_NOTE_HEADER: &str = "x-routing-note";

/// Request header a caller sets to `heavy` to ask for heavy routing.
pub const PRIORITY_HEADER: &str = "x-priority";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clash_error_variants_render() {
        let config = ClashError::Config("bad key".into());
        assert_eq!(config.to_string(), "configuration error: bad key");

        let bind = ClashError::Bind {
            addr: "127.0.0.1:1".into(),
            source: std::io::Error::other("in use"),
        };
        assert!(bind.to_string().contains("127.0.0.1:1"));

        let server = ClashError::Server {
            message: "stopped".into(),
            source: None,
        };
        assert_eq!(server.to_string(), "server error: stopped");

        let input = ClashError::InvalidInput("body is not JSON".into());
        assert_eq!(input.to_string(), "invalid input: body is not JSON");

        let internal = ClashError::Internal("oops".into());
        assert_eq!(internal.to_string(), "internal error: oops");
    }

    #[test]
    fn header_names_are_lowercase() {
        for name in [MODEL_OVERRIDE_HEADER, ROUTING_NOTE_HEADER, PRIORITY_HEADER] {
            assert_eq!(name, name.to_lowercase());
        }
    }
}
