//! Adaptive admission control over the number of in-flight requests.

use std::time::{Duration, Instant};
use tampi_config::capacity::CapacityConfig;

/// Tracks a saturation epoch and doubles capacity when it persists past a timeout.
///
/// Capacity never shrinks once grown, matching the original design: growth is the only
/// response available to a detected saturation, since the alternative (a worse deadlock risk)
/// is strictly worse than a larger but still bounded array.
pub struct CapacityController {
    min: usize,
    max: usize,
    current: usize,
    timeout: Duration,
    saturated_since: Option<Instant>,
}

impl CapacityController {
    /// Creates a controller starting at `config.min`, allowed to grow up to `config.max`.
    #[must_use]
    pub fn new(config: CapacityConfig, timeout: Duration) -> Self {
        Self {
            min: config.min,
            max: config.max,
            current: config.min,
            timeout,
            saturated_since: None,
        }
    }

    /// The current capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.current
    }

    /// The ceiling capacity can ever grow to. Used to size resources that must be allocated
    /// up front for the worst case, such as the object allocator's central free-list.
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Updates the controller with the outcome of one polling tick.
    ///
    /// `now` is taken as a parameter rather than read from the clock so the saturation timeout
    /// can be driven deterministically in tests.
    pub fn evaluate(&mut self, pending: usize, completed: usize, now: Instant) {
        if pending < self.current || completed > 0 {
            self.saturated_since = None;
            return;
        }

        let since = *self.saturated_since.get_or_insert(now);
        if now.duration_since(since) < self.timeout {
            return;
        }

        let grown = self.current.saturating_mul(2).min(self.max);
        if grown > self.current {
            tracing::warn!(old = self.current, new = grown, "increasing capacity to {grown}");
            self.current = grown;
        }
        self.saturated_since = None;
    }

    #[cfg(test)]
    fn min(&self) -> usize {
        self.min
    }
}
