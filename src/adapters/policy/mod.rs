//! Policy adapters.

mod grace_period;

pub use grace_period::{GracePeriodPolicy, DEFAULT_CANCEL_GRACE_DAYS};
