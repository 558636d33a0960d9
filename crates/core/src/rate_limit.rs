//! Fixed-window rate limiter keyed by client identity.
//!
//! The limiter is an explicit value owned by whoever needs it (the HTTP
//! layer keeps one per policy in its state). Time comes from an injected
//! [`Clock`] so tests can step it forward instead of sleeping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::CoreError;

/// Source of monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock implementation used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        self.origin + offset
    }
}

/// At most `max_events` recorded events per key inside each `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_events: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max_events: u32, window: Duration) -> Self {
        Self { max_events, window }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimiter {
    policy: RateLimitPolicy,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Fail with [`CoreError::RateLimited`] if `key` has used up its
    /// window. Does not consume a slot.
    pub fn check(&self, key: &str) -> Result<(), CoreError> {
        let now = self.clock.now();
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(window) = windows.get(key) else {
            return Ok(());
        };
        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.policy.window || window.count < self.policy.max_events {
            return Ok(());
        }
        let remaining = self.policy.window - elapsed;
        Err(CoreError::RateLimited {
            retry_after_secs: ceil_secs(remaining),
        })
    }

    /// Consume one slot for `key`, opening a new window if the previous
    /// one has expired.
    pub fn record(&self, key: &str) {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.current_window(&mut windows, key, now);
        window.count = window.count.saturating_add(1);
    }

    /// Check and consume a slot under one lock. Concurrent callers for the
    /// same key can never take more than `max_events` slots between them.
    pub fn try_acquire(&self, key: &str) -> Result<(), CoreError> {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.current_window(&mut windows, key, now);
        if window.count >= self.policy.max_events {
            let elapsed = now.saturating_duration_since(window.started);
            return Err(CoreError::RateLimited {
                retry_after_secs: ceil_secs(self.policy.window.saturating_sub(elapsed)),
            });
        }
        window.count += 1;
        Ok(())
    }

    /// Give back a slot taken by [`try_acquire`](Self::try_acquire) when the
    /// guarded operation did not go through.
    pub fn release(&self, key: &str) {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(window) = windows.get_mut(key) {
            window.count = window.count.saturating_sub(1);
            if window.count == 0 {
                windows.remove(key);
            }
        }
    }

    pub fn reset(&self, key: &str) {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// The live window for `key`, restarted if the stored one has expired.
    fn current_window<'a>(
        &self,
        windows: &'a mut HashMap<String, Window>,
        key: &str,
        now: Instant,
    ) -> &'a mut Window {
        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(window.started) >= self.policy.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }
        window
    }

    /// Drop every expired window. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let before = windows.len();
        windows.retain(|_, w| now.saturating_duration_since(w.started) < self.policy.window);
        before - windows.len()
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}
