use crate::LogEvent;
use alloy_primitives::{Address, B256};

/// A filter selecting the logs of one event emitted by one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogFilter {
    /// The address of the emitting contract.
    pub address: Address,
    /// The event signature hash, matched against the first topic.
    pub event_signature: B256,
}

impl LogFilter {
    /// Returns a new [`LogFilter`].
    pub const fn new(address: Address, event_signature: B256) -> Self {
        Self { address, event_signature }
    }

    /// Returns true if the log matches the filter.
    pub fn matches(&self, log: &LogEvent) -> bool {
        log.address == self.address && log.signature() == Some(self.event_signature)
    }
}

impl core::fmt::Display for LogFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.address, self.event_signature)
    }
}
