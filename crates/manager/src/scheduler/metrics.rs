use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics of a task run by the [`super::TaskScheduler`].
#[derive(Metrics, Clone)]
#[metrics(scope = "scheduler")]
pub(crate) struct TaskMetrics {
    /// The number of runs.
    pub runs: Counter,
    /// The number of runs that returned a transient error.
    pub failures: Counter,
    /// The duration of a run.
    pub run_duration: Histogram,
}

/// The metrics for the [`super::SchedulerHandle`].
#[derive(Metrics, Clone)]
#[metrics(scope = "scheduler")]
pub(crate) struct HandleMetrics {
    /// Failed to send command to the scheduler from handle counter.
    pub handle_send_command_failed: Counter,
}
