//! Fixed-window rate limiting keyed by client identifier
//!
//! The table lives in process memory and is lost on restart. Expired
//! windows are reset lazily on the next request for a key; the optional
//! sweeper only keeps the table from growing.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::RateLimitConfig;

/// Smallest sweep period accepted by the sweeper
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// The caller should wait this many whole seconds (at least 1)
    Limited { retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RateLimitDecision::Allowed => None,
            RateLimitDecision::Limited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs))
            }
        }
    }
}

/// Requests seen for one key in its current window
#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at: Instant,
}

impl RateLimitEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.reset_at
    }
}

/// Process-local fixed-window rate limiter
pub struct RateLimiter<C: Clock = SystemClock> {
    entries: DashMap<String, RateLimitEntry>,
    config: RateLimitConfig,
    clock: C,
}

impl RateLimiter<SystemClock> {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request for `key` and decide whether it may proceed
    ///
    /// The check and the increment happen under the key's shard lock, so
    /// concurrent callers for the same key never overshoot the limit.
    pub fn check_and_record(&self, key: &str) -> RateLimitDecision {
        let now = self.clock.now();
        let fresh = RateLimitEntry {
            count: 1,
            reset_at: now + self.config.window(),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                RateLimitDecision::Allowed
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.is_expired(now) {
                    *entry = fresh;
                    RateLimitDecision::Allowed
                } else if entry.count < self.config.max_requests {
                    entry.count += 1;
                    RateLimitDecision::Allowed
                } else {
                    let remaining = entry.reset_at.saturating_duration_since(now);
                    let secs = remaining.as_millis().div_ceil(1000).max(1);
                    RateLimitDecision::Limited {
                        retry_after_secs: u64::try_from(secs).unwrap_or(u64::MAX),
                    }
                }
            }
        }
    }

    /// Requests counted for `key` in its live window, if any
    pub fn count(&self, key: &str) -> Option<u32> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.count)
    }

    /// Drop every entry whose window has elapsed; returns how many were removed
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of tracked keys, expired or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a background task that sweeps on the configured interval
    ///
    /// The task holds a weak reference and stops once the limiter is dropped,
    /// or when the returned handle is shut down or dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweeperHandle {
        let period = self.config.sweep_interval().max(MIN_SWEEP_INTERVAL);
        let limiter = Arc::downgrade(self);
        let task = tokio::spawn(sweep_loop(limiter, period));
        tracing::debug!("Rate limit sweeper started (every {:?})", period);
        SweeperHandle { task }
    }
}

async fn sweep_loop<C: Clock>(weak: Weak<RateLimiter<C>>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick fires immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(limiter) = weak.upgrade() else {
            tracing::debug!("Rate limiter dropped, sweeper exiting");
            break;
        };
        let removed = limiter.sweep();
        if removed > 0 {
            tracing::debug!(
                "Swept {} expired rate limit entries, {} remain",
                removed,
                limiter.len()
            );
        }
    }
}

/// Owns the sweeper task; dropping it stops the task
#[derive(Debug)]
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper
    pub fn shutdown(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
