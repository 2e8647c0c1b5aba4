use std::time::Duration;

use alloy_primitives::Address;

/// The default bound on the wait for a submission receipt.
#[cfg(not(any(test, feature = "test-utils")))]
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(300);
/// The default bound on the wait for a submission receipt.
#[cfg(any(test, feature = "test-utils"))]
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_millis(200);

/// The default interval between two receipt polls.
#[cfg(not(any(test, feature = "test-utils")))]
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// The default interval between two receipt polls.
#[cfg(any(test, feature = "test-utils"))]
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// The default number of blocks a submission must be buried under to be final.
pub const DEFAULT_FINALITY_DELAY: u64 = 64;

/// The configuration of the [`crate::BatchSubmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSubmitterConfig {
    /// The canonical transaction chain contract the batches are appended to.
    pub contract_address: Address,
    /// The bound on the wait for the submission receipt.
    pub receipt_timeout: Duration,
    /// The interval between two receipt polls.
    pub receipt_poll_interval: Duration,
}

impl BatchSubmitterConfig {
    /// Returns a config submitting to the contract with the default timings.
    pub const fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }
}

/// The configuration of the [`crate::BatchFinalizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchFinalizerConfig {
    /// The number of blocks mined on top of the submission block before the batch is final.
    pub finality_delay: u64,
}

impl Default for BatchFinalizerConfig {
    fn default() -> Self {
        Self { finality_delay: DEFAULT_FINALITY_DELAY }
    }
}
