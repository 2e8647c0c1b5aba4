use std::time::Duration;

/// The default period between two runs of a task.
#[cfg(not(any(test, feature = "test-utils")))]
pub const DEFAULT_TASK_PERIOD: Duration = Duration::from_secs(15);
/// The default period between two runs of a task.
#[cfg(any(test, feature = "test-utils"))]
pub const DEFAULT_TASK_PERIOD: Duration = Duration::from_millis(10);

/// The schedule of a [`crate::ScheduledTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskConfig {
    /// The period between two runs. A run that did work is followed by another run right away.
    pub period: Duration,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self { period: DEFAULT_TASK_PERIOD }
    }
}
