use rollup_db::DatabaseError;
use rollup_node_providers::ProviderError;

/// A boxed error returned by an [`crate::EventHandler`].
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// An error that occurred in the chain event watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// An error at the base chain provider.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    /// An error at the cursor store.
    #[error("cursor store error: {0}")]
    Database(#[from] DatabaseError),
    /// The provider does not know a block below its head.
    #[error("unknown block {0}")]
    MissingBlock(u64),
    /// A handler failed to handle an event. Skipping the event would leave a gap.
    #[error("handler for {subscription_id} failed at block {block_number}: {source}")]
    Handler {
        /// The subscription of the handler.
        subscription_id: String,
        /// The block of the event.
        block_number: u64,
        /// The handler error.
        source: HandlerError,
    },
    /// The provider returned events out of order.
    #[error("out of order event for {subscription_id}: {next:?} after {previous:?}")]
    OutOfOrder {
        /// The subscription the events belong to.
        subscription_id: String,
        /// The `(block number, log index)` position of the previous event.
        previous: (u64, u64),
        /// The `(block number, log index)` position of the offending event.
        next: (u64, u64),
    },
    /// The new heads subscription was closed.
    #[error("new heads subscription closed for {0}")]
    SubscriptionClosed(String),
}

impl WatcherError {
    /// Returns true if the error stops the watcher. Other errors are retried.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Handler { .. } | Self::OutOfOrder { .. } | Self::SubscriptionClosed(_))
    }
}
