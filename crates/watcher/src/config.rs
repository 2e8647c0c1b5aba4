use std::time::Duration;

/// The sleep between two attempts at a failed fetch or cursor write.
#[cfg(any(test, feature = "test-utils"))]
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(5);
/// The sleep between two attempts at a failed fetch or cursor write.
#[cfg(not(any(test, feature = "test-utils")))]
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// The default maximum block range of a single log query.
pub const DEFAULT_LOG_QUERY_BLOCK_RANGE: u64 = 500;

/// The configuration of the [`crate::ChainEventWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherConfig {
    /// The block the catch-up sync starts from when no cursor is persisted.
    pub earliest_block: u64,
    /// The number of confirmations a block needs before its events are dispatched. A value of
    /// one dispatches the head block.
    pub confirmations: u64,
    /// The sleep between two attempts at a failed fetch or cursor write.
    pub retry_backoff: Duration,
    /// The maximum block range of a single log query.
    pub log_query_block_range: u64,
}

impl WatcherConfig {
    /// Returns the highest block considered final when the chain head is `head`, [`None`] if no
    /// block has enough confirmations yet.
    pub const fn final_block(&self, head: u64) -> Option<u64> {
        let confirmations = if self.confirmations == 0 { 1 } else { self.confirmations };
        head.checked_sub(confirmations - 1)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            earliest_block: 0,
            confirmations: 1,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            log_query_block_range: DEFAULT_LOG_QUERY_BLOCK_RANGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_block() {
        let config = WatcherConfig::default();
        assert_eq!(config.final_block(0), Some(0));
        assert_eq!(config.final_block(7), Some(7));

        let config = WatcherConfig { confirmations: 3, ..Default::default() };
        assert_eq!(config.final_block(1), None);
        assert_eq!(config.final_block(2), Some(0));
        assert_eq!(config.final_block(10), Some(8));

        let config = WatcherConfig { confirmations: 0, ..Default::default() };
        assert_eq!(config.final_block(4), Some(4));
    }
}
