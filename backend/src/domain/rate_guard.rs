//! Fixed-window admission counter keyed by client.
//!
//! Each key gets a counter and the start time of its current window. The
//! first request after the window has elapsed opens a fresh window with a
//! count of one. Because the whole counter resets at the window boundary, a
//! client can be admitted up to twice the limit across a boundary; this is a
//! known property of fixed windows and is accepted here.
//!
//! The map sits behind one mutex that is held only while a counter is read or
//! updated, never across I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tokio::task::JoinHandle;
use tracing::debug;

use super::Error;

/// Default number of requests admitted per key and window.
pub const DEFAULT_RATE_LIMIT: u32 = 100;
/// Default window length.
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);

/// Construction-time limits for a [`RateGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateGuardConfig {
    limit: u32,
    window: Duration,
}

impl RateGuardConfig {
    /// Create a configuration admitting `limit` requests per `window`.
    #[must_use]
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    /// Requests admitted per window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateGuardConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW)
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    started_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl RateWindow {
    const fn open(now: DateTime<Utc>) -> Self {
        Self {
            count: 1,
            started_at: now,
            last_seen: now,
        }
    }
}

/// Per-key request counter.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use mockable::DefaultClock;
/// use ride_dispatch::domain::{RateGuard, RateGuardConfig};
///
/// let guard = RateGuard::new(RateGuardConfig::new(2, Duration::from_secs(60)), Arc::new(DefaultClock));
/// assert!(guard.check("10.0.0.1").is_ok());
/// assert!(guard.check("10.0.0.1").is_ok());
/// assert!(guard.check("10.0.0.1").is_err());
/// ```
pub struct RateGuard {
    limit: u32,
    window: TimeDelta,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl RateGuard {
    /// Create a guard with fixed limits.
    pub fn new(config: RateGuardConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit: config.limit(),
            window: TimeDelta::from_std(config.window()).unwrap_or(TimeDelta::MAX),
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request for `key`, rejecting it once the window's allowance is
    /// spent.
    ///
    /// Rejected requests do not advance the counter.
    pub fn check(&self, key: &str) -> Result<(), Error> {
        let now = self.clock.utc();
        let mut windows = self.lock_windows();

        let Some(entry) = windows.get_mut(key) else {
            windows.insert(key.to_owned(), RateWindow::open(now));
            return Ok(());
        };

        entry.last_seen = now;
        if now - entry.started_at > self.window {
            *entry = RateWindow::open(now);
            return Ok(());
        }
        if entry.count >= self.limit {
            return Err(Error::rate_limited("Rate limit exceeded"));
        }
        entry.count += 1;
        Ok(())
    }

    /// Drop keys that have been idle for longer than the window. Returns the
    /// number of evicted keys.
    pub fn sweep(&self) -> usize {
        let now = self.clock.utc();
        let mut windows = self.lock_windows();
        let before = windows.len();
        windows.retain(|_, entry| now - entry.last_seen <= self.window);
        before - windows.len()
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.lock_windows().len()
    }

    /// Run [`RateGuard::sweep`] every `period` on the current runtime.
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let evicted = self.sweep();
                if evicted > 0 {
                    debug!(evicted, remaining = self.tracked_keys(), "rate guard sweep");
                }
            }
        })
    }

    fn lock_windows(&self) -> MutexGuard<'_, HashMap<String, RateWindow>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::{MutableClock, epoch};
    use rstest::{fixture, rstest};

    const LIMIT: u32 = 3;

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(epoch()))
    }

    fn guard(clock: &Arc<MutableClock>) -> RateGuard {
        RateGuard::new(
            RateGuardConfig::new(LIMIT, Duration::from_secs(60)),
            clock.clone(),
        )
    }

    #[rstest]
    fn admits_limit_then_rejects(clock: Arc<MutableClock>) {
        let guard = guard(&clock);
        for _ in 0..LIMIT {
            guard.check("1.2.3.4").expect("within allowance");
        }
        let err = guard.check("1.2.3.4").expect_err("over allowance");
        assert_eq!(err.code(), ErrorCode::RateLimited);
    }

    #[rstest]
    fn keys_are_counted_independently(clock: Arc<MutableClock>) {
        let guard = guard(&clock);
        for _ in 0..LIMIT {
            guard.check("a").expect("within allowance");
        }
        assert!(guard.check("b").is_ok());
        assert!(guard.check("a").is_err());
    }

    #[rstest]
    fn window_boundary_is_inclusive(clock: Arc<MutableClock>) {
        let guard = guard(&clock);
        for _ in 0..LIMIT {
            guard.check("k").expect("within allowance");
        }
        clock.advance_seconds(60);
        assert!(guard.check("k").is_err(), "exactly one window later is still the same window");
    }

    #[rstest]
    fn elapsed_window_starts_fresh_count(clock: Arc<MutableClock>) {
        let guard = guard(&clock);
        for _ in 0..LIMIT {
            guard.check("k").expect("within allowance");
        }
        assert!(guard.check("k").is_err());

        clock.advance_seconds(61);
        guard.check("k").expect("fresh window admits");
        // Fresh count of one leaves LIMIT - 1 more admissions.
        for _ in 1..LIMIT {
            guard.check("k").expect("within fresh allowance");
        }
        assert!(guard.check("k").is_err());
    }

    #[rstest]
    fn sweep_evicts_idle_keys_only(clock: Arc<MutableClock>) {
        let guard = guard(&clock);
        guard.check("idle").expect("admitted");
        clock.advance_seconds(45);
        guard.check("active").expect("admitted");
        clock.advance_seconds(30);

        assert_eq!(guard.sweep(), 1);
        assert_eq!(guard.tracked_keys(), 1);
        assert!(guard.check("active").is_ok());
    }

    #[rstest]
    fn rejected_requests_refresh_last_seen(clock: Arc<MutableClock>) {
        let guard = guard(&clock);
        for _ in 0..=LIMIT {
            let _ = guard.check("noisy");
        }
        clock.advance_seconds(50);
        let _ = guard.check("noisy");
        clock.advance_seconds(20);
        assert_eq!(guard.sweep(), 0);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_periodically(clock: Arc<MutableClock>) {
        let guard = Arc::new(guard(&clock));
        guard.check("k").expect("admitted");
        clock.advance_seconds(120);

        let handle = guard.clone().spawn_sweeper(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert_eq!(guard.tracked_keys(), 0);
        handle.abort();
    }
}
