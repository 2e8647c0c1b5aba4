//! This library contains the task scheduler of the rollup node.
//!
//! The scheduler drives the periodic components (fraud detection, batch submission and
//! finalization) and turns the first fatal error of any of them, or of a chain event watcher,
//! into a single [`ShutdownSignal`].

mod config;
pub use config::{TaskConfig, DEFAULT_TASK_PERIOD};

mod error;
pub use error::TaskError;

mod scheduler;
pub use scheduler::{SchedulerCommand, SchedulerHandle, TaskScheduler};

mod shutdown;
pub use shutdown::{ShutdownReason, ShutdownSignal};

mod task;
pub use task::ScheduledTask;
