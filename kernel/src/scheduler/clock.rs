//! Global simulation clock.

use serde::{Deserialize, Serialize};

/// Cycle counter shared by the scheduler and the executor.
///
/// Owned by a [`Scheduler`](super::Scheduler) and lent to the executor for
/// the duration of a slice. It only ever moves forward.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clock {
    now: u64,
}

impl Clock {
    /// A clock at time zero.
    pub fn new() -> Self {
        Clock::default()
    }

    /// Current time in cycles.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Move the clock forward by `cycles`.
    pub fn advance(&mut self, cycles: u64) {
        self.now = self.now.saturating_add(cycles);
    }
}
