//! The crate exposes the base chain read and write interfaces used across the rollup node, along
//! with an implementation backed by an alloy provider.

pub use alloy::{AlloyChainProvider, DEFAULT_HEADS_POLL_INTERVAL};
mod alloy;

pub use chain::{ChainReader, ChainTransaction, NewHeadsProvider, TransactionSubmitter};
mod chain;

pub use error::ProviderError;
mod error;

pub use subscription::{Subscription, SubscriptionSink};
mod subscription;

pub use wait::{wait_for_log, wait_for_receipt};
mod wait;

/// Test utilities for the providers.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
