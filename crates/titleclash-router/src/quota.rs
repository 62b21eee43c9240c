// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily quota on heavy routing approvals.
//!
//! The quota keeps an in-memory count of heavy approvals for the current
//! window. The window check and the check-then-increment run under a single
//! lock acquisition, so concurrent callers can never push the count past the
//! limit. State is never persisted; a restart starts from zero.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use titleclash_config::QuotaWindow;
use titleclash_core::{Clock, DAILY_HEAVY_QUOTA, start_of_utc_day};
use tracing::{info, warn};

/// Result of asking the quota for one heavy slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaOutcome {
    /// A slot was taken; `used` is the count after the increment.
    Approved { used: u32 },
    /// The window's quota is already spent.
    Exhausted,
    /// Quota was available but the request was too large to spend it on.
    TooLarge,
}

/// Point-in-time view of the quota, for status endpoints and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    pub heavy_count_today: u32,
    pub daily_quota: u32,
    pub remaining: u32,
    pub quota_reset_at: DateTime<Utc>,
    pub next_reset_at: DateTime<Utc>,
}

#[derive(Debug)]
struct QuotaState {
    heavy_count_today: u32,
    quota_reset_at: DateTime<Utc>,
}

/// Thread-safe heavy-approval counter with a daily window.
pub struct HeavyQuota {
    limit: u32,
    window: QuotaWindow,
    clock: Arc<dyn Clock>,
    state: Mutex<QuotaState>,
}

impl std::fmt::Debug for HeavyQuota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeavyQuota")
            .field("limit", &self.limit)
            .field("window", &self.window)
            .field("state", &*self.lock())
            .finish()
    }
}

impl HeavyQuota {
    /// Create a quota with the fixed daily limit of [`DAILY_HEAVY_QUOTA`].
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limit(DAILY_HEAVY_QUOTA, clock)
    }

    /// Create a quota with a custom limit.
    pub fn with_limit(limit: u32, clock: Arc<dyn Clock>) -> Self {
        let quota_reset_at = start_of_utc_day(clock.now());
        Self {
            limit,
            window: QuotaWindow::UtcDay,
            clock,
            state: Mutex::new(QuotaState {
                heavy_count_today: 0,
                quota_reset_at,
            }),
        }
    }

    /// Use the given rollover policy.
    pub fn with_window(mut self, window: QuotaWindow) -> Self {
        self.window = window;
        self
    }

    /// Maximum heavy approvals per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Try to take one heavy slot.
    ///
    /// `fits` says whether the request passed the size check. Exhaustion is
    /// reported ahead of size, and only an `Approved` outcome increments.
    pub fn try_acquire(&self, fits: bool) -> QuotaOutcome {
        let now = self.clock.now();
        let mut state = self.lock();
        self.maybe_rollover(&mut state, now);

        if state.heavy_count_today >= self.limit {
            return QuotaOutcome::Exhausted;
        }
        if !fits {
            return QuotaOutcome::TooLarge;
        }

        state.heavy_count_today += 1;
        let used = state.heavy_count_today;
        drop(state);

        if used == self.limit {
            warn!(limit = self.limit, "daily heavy quota exhausted");
        } else if used == self.warn_threshold() {
            warn!(used, limit = self.limit, "approaching daily heavy quota (80%+)");
        }

        QuotaOutcome::Approved { used }
    }

    /// Current usage, after applying any pending rollover.
    pub fn snapshot(&self) -> QuotaSnapshot {
        let now = self.clock.now();
        let mut state = self.lock();
        self.maybe_rollover(&mut state, now);

        QuotaSnapshot {
            heavy_count_today: state.heavy_count_today,
            daily_quota: self.limit,
            remaining: self.limit.saturating_sub(state.heavy_count_today),
            quota_reset_at: state.quota_reset_at,
            next_reset_at: state.quota_reset_at + window_length(),
        }
    }

    /// Heavy approvals in the current window (no rollover applied).
    pub fn used(&self) -> u32 {
        self.lock().heavy_count_today
    }

    fn maybe_rollover(&self, state: &mut QuotaState, now: DateTime<Utc>) {
        if now - state.quota_reset_at < window_length() {
            return;
        }
        let previous = state.heavy_count_today;
        state.heavy_count_today = 0;
        state.quota_reset_at = match self.window {
            QuotaWindow::UtcDay => start_of_utc_day(now),
            QuotaWindow::Rolling => now,
        };
        info!(
            previous_count = previous,
            reset_at = %state.quota_reset_at,
            "heavy quota window rolled over"
        );
    }

    /// 80% of the limit, rounded up, without overflowing near `u32::MAX`.
    fn warn_threshold(&self) -> u32 {
        let threshold = (u64::from(self.limit) * 4).div_ceil(5).max(1);
        u32::try_from(threshold).unwrap_or(self.limit)
    }

    // The counter is plain data; a panic elsewhere cannot leave it inconsistent.
    fn lock(&self) -> MutexGuard<'_, QuotaState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn window_length() -> Duration {
    Duration::hours(24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use titleclash_test_utils::ManualClock;
    use tracing_test::traced_test;

    fn quota_at(clock: &Arc<ManualClock>, limit: u32) -> HeavyQuota {
        HeavyQuota::with_limit(limit, clock.clone())
    }

    #[test]
    fn starts_at_start_of_utc_day() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 17, 45, 0));
        let quota = HeavyQuota::new(clock.clone());
        let snap = quota.snapshot();
        assert_eq!(snap.heavy_count_today, 0);
        assert_eq!(snap.daily_quota, DAILY_HEAVY_QUOTA);
        assert_eq!(snap.quota_reset_at, start_of_utc_day(clock.now()));
        assert_eq!(snap.next_reset_at - snap.quota_reset_at, Duration::hours(24));
    }

    #[test]
    fn approves_until_limit_then_exhausts() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = quota_at(&clock, 3);
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Approved { used: 1 });
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Approved { used: 2 });
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Approved { used: 3 });
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Exhausted);
        assert_eq!(quota.used(), 3);
    }

    #[test]
    fn too_large_does_not_consume() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = quota_at(&clock, 3);
        assert_eq!(quota.try_acquire(false), QuotaOutcome::TooLarge);
        assert_eq!(quota.used(), 0);
    }

    #[test]
    fn exhausted_wins_over_too_large() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = quota_at(&clock, 1);
        quota.try_acquire(true);
        assert_eq!(quota.try_acquire(false), QuotaOutcome::Exhausted);
    }

    #[test]
    #[traced_test]
    fn resets_after_24_hours() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = quota_at(&clock, 2);
        quota.try_acquire(true);
        quota.try_acquire(true);
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Exhausted);

        // Reset point is 2026-06-10T00:00Z; 24h later is the next midnight.
        clock.set(start_of_utc_day(clock.now()) + Duration::hours(24));
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Approved { used: 1 });
        assert!(logs_contain("heavy quota window rolled over"));
    }

    #[test]
    fn no_reset_before_window_ends() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 0, 0, 0));
        let quota = quota_at(&clock, 1);
        quota.try_acquire(true);
        clock.advance(Duration::hours(24) - Duration::seconds(1));
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Exhausted);
    }

    #[test]
    fn utc_day_window_realigns_after_idle_gap() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = quota_at(&clock, 5);
        quota.try_acquire(true);

        // Idle for three and a half days.
        clock.advance(Duration::hours(84));
        let snap = quota.snapshot();
        assert_eq!(snap.heavy_count_today, 0);
        assert_eq!(snap.quota_reset_at, start_of_utc_day(clock.now()));
    }

    #[test]
    fn rolling_window_resets_relative_to_last_reset() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = quota_at(&clock, 1).with_window(QuotaWindow::Rolling);
        quota.try_acquire(true);

        // First rollover happens once 24h have passed since midnight.
        clock.set(start_of_utc_day(clock.now()) + Duration::hours(30));
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Approved { used: 1 });
        let reset_at = quota.snapshot().quota_reset_at;
        assert_eq!(reset_at, clock.now());

        // The next window ends 24h after that moment, not at midnight.
        clock.advance(Duration::hours(23));
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Exhausted);
        clock.advance(Duration::hours(1));
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Approved { used: 1 });
    }

    #[test]
    fn clock_moving_backwards_does_not_reset() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = quota_at(&clock, 1);
        quota.try_acquire(true);
        clock.advance(Duration::hours(-48));
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Exhausted);
    }

    #[test]
    fn snapshot_reports_remaining() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = quota_at(&clock, 10);
        for _ in 0..4 {
            quota.try_acquire(true);
        }
        let snap = quota.snapshot();
        assert_eq!(snap.heavy_count_today, 4);
        assert_eq!(snap.remaining, 6);
    }

    #[test]
    #[traced_test]
    fn warns_at_eighty_percent() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = quota_at(&clock, 10);
        for _ in 0..8 {
            quota.try_acquire(true);
        }
        assert!(logs_contain("approaching daily heavy quota"));
    }

    #[test]
    fn warn_threshold_handles_large_limits() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        assert_eq!(quota_at(&clock, u32::MAX).warn_threshold(), 3_435_973_836);
        assert_eq!(quota_at(&clock, 1_500_000_000).warn_threshold(), 1_200_000_000);
        assert_eq!(quota_at(&clock, 1).warn_threshold(), 1);

        let quota = quota_at(&clock, u32::MAX);
        assert_eq!(quota.try_acquire(true), QuotaOutcome::Approved { used: 1 });
    }

    #[test]
    fn parallel_acquires_never_overshoot() {
        let clock = Arc::new(ManualClock::at(2026, 6, 10, 9, 0, 0));
        let quota = Arc::new(quota_at(&clock, 50));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let quota = Arc::clone(&quota);
                std::thread::spawn(move || {
                    (0..10)
                        .filter(|_| matches!(quota.try_acquire(true), QuotaOutcome::Approved { .. }))
                        .count()
                })
            })
            .collect();

        let approved: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(approved, 50);
        assert_eq!(quota.used(), 50);
    }
}
