//! Clock Module
//!
//! Time source used to stamp and check entry expiry.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

// == Clock Trait ==
/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

// == System Clock ==
/// Monotonic wall clock, the default time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// == Manual Clock ==
/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one clone and hand the
/// other to the cache.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ttl_lru_cache::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.now() - start, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Moves time forward for every clone of this clock.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
