//! Per-key request admission under two concurrent sliding-window caps.
//!
//! Each key is limited independently: a request at tick `t` is admitted only
//! if fewer than `max_admits` prior admits fall within each window (short and
//! long) ending at `t`. Rejected requests consume no capacity.

use std::collections::HashMap;

use crate::model::{Tick, Verdict};

mod state;
pub use state::KeyHistory;

/// One sliding-window cap: at most `max_admits` admitted events per key
/// within any `window` ticks, boundary inclusive.
#[derive(Debug, Clone, Copy)]
pub struct WindowCap {
    pub window: u64,
    pub max_admits: usize,
}

/// The two simultaneously enforced caps. `long.window` must exceed
/// `short.window`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub short: WindowCap,
    pub long: WindowCap,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            short: WindowCap {
                window: 5,
                max_admits: 2,
            },
            long: WindowCap {
                window: 30,
                max_admits: 5,
            },
        }
    }
}

/// The rate limiter.
///
/// Holds the retained admit history per key. One instance owns its entire
/// state; share across threads only behind a mutex.
pub struct RateLimiter {
    limits: RateLimits,
    keys: HashMap<String, KeyHistory>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            keys: HashMap::new(),
        }
    }

    pub fn limits(&self) -> &RateLimits {
        &self.limits
    }

    /// Classify one event. Admits iff both windows have capacity for `key`
    /// at `tick`; records the tick on admit, leaves state untouched on
    /// reject.
    ///
    /// Events must be fed in input order with non-decreasing ticks.
    pub fn check(&mut self, tick: Tick, key: &str) -> Verdict {
        let history = self.keys.entry(key.to_owned()).or_default();
        history.evict(tick, self.limits.long.window);

        let short_free =
            history.count_within(tick, self.limits.short.window) < self.limits.short.max_admits;
        // everything retained after eviction is inside the long window
        let long_free = history.len() < self.limits.long.max_admits;

        if short_free && long_free {
            history.record(tick);
            Verdict::Admitted
        } else {
            // a reject must not materialize per-key state
            if history.is_empty() {
                self.keys.remove(key);
            }
            Verdict::Rejected
        }
    }

    /// Drop every key whose retained history is empty as of `now`.
    pub fn purge(&mut self, now: Tick) {
        let horizon = self.limits.long.window;
        self.keys.retain(|_, history| {
            history.evict(now, horizon);
            !history.is_empty()
        });
    }

    /// Number of keys currently holding retained state.
    pub fn tracked_keys(&self) -> usize {
        self.keys.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimits::default())
    }
}
