//! Clock port.
//!
//! Every time-dependent decision reads the current time through this port so
//! the sweep and the operations can be driven by a fixed clock in tests.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
