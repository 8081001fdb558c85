//! Clock adapters.

use std::sync::{Arc, RwLock};

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Settable clock for tests. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<Timestamp>>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    pub fn set(&self, now: Timestamp) {
        if let Ok(mut slot) = self.now.write() {
            *slot = now;
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        if let Ok(mut slot) = self.now.write() {
            *slot = slot.plus_secs(secs);
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.read().map(|t| *t).unwrap_or_else(|_| Timestamp::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances_for_every_clone() {
        let start = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        let clock = FixedClock::new(start);
        let shared = clock.clone();

        clock.advance_secs(90);
        assert_eq!(shared.now().as_unix_secs(), 1_700_000_090);

        shared.set(start);
        assert_eq!(clock.now(), start);
    }
}
