use std::time::Duration;

/// The backoff between two attempts at handling the same item.
#[cfg(any(test, feature = "test-utils"))]
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(10);
/// The backoff between two attempts at handling the same item.
#[cfg(not(any(test, feature = "test-utils")))]
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// The configuration of an [`crate::OrderedPersistentQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// The sleep between a failed handler invocation and the next attempt.
    pub retry_backoff: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { retry_backoff: DEFAULT_RETRY_BACKOFF }
    }
}
