// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Injectable time source.
//!
//! Quota windows and rate-limit windows read the current time through
//! [`Clock`] so tests can move time forward without sleeping.

use chrono::{DateTime, NaiveTime, Utc};

/// A source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Midnight (00:00:00 UTC) of the day containing `ts`.
pub fn start_of_utc_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn start_of_day_truncates_time() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let start = start_of_utc_day(ts);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn start_of_day_is_idempotent_at_midnight() {
        let midnight = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(start_of_utc_day(midnight), midnight);
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    proptest! {
        #[test]
        fn start_of_day_is_within_24h_before(secs in 0i64..4_102_444_800i64) {
            let ts = Utc.timestamp_opt(secs, 0).unwrap();
            let start = start_of_utc_day(ts);
            prop_assert!(start <= ts);
            prop_assert!(ts - start < chrono::Duration::hours(24));
        }
    }
}
