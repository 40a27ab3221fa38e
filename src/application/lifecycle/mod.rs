//! Lifecycle engine.
//!
//! Time-driven transitions nobody asks for explicitly: trials that run
//! out, periods that end, and renewal warnings. A sweep evaluates every
//! subscription against one instant; the scheduler repeats sweeps.

mod report;
mod scheduler;
mod sweep;

pub use report::{SweepFailure, SweepFailureKind, SweepOptions, SweepReport};
pub use scheduler::{SweepScheduler, SweepSchedulerConfig};
pub use sweep::SweepSubscriptionsHandler;
