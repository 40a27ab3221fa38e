//! Clock adapters.
//!
//! - `SystemClock` - Wall-clock UTC time
//! - `FixedClock` - Manually controlled time for tests and replays

use std::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = now.add_days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
