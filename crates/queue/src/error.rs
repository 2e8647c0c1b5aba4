use rollup_db::DatabaseError;

/// A boxed error returned by injected queue behavior.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error occurring in the ordered queue.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// An error occurred at the durable store.
    #[error("queue store error: {0}")]
    Database(#[from] DatabaseError),
    /// The payload could not be serialized.
    #[error("failed to serialize payload at index {index}: {source}")]
    Serialize {
        /// The index of the item.
        index: u64,
        /// The serialization error.
        source: BoxError,
    },
    /// A persisted payload could not be deserialized.
    #[error("failed to deserialize payload at index {index}: {source}")]
    Deserialize {
        /// The index of the item.
        index: u64,
        /// The deserialization error.
        source: BoxError,
    },
    /// An item was marked processed before its predecessor.
    #[error("cannot mark item {index} processed, last processed index is {last_processed:?}")]
    OutOfOrder {
        /// The index that was marked.
        index: u64,
        /// The last processed index.
        last_processed: Option<u64>,
    },
    /// No item is stored at the index.
    #[error("no queue item at index {0}")]
    ItemNotFound(u64),
}

impl QueueError {
    /// Returns true if the error breaks the ordering of the queue and cannot be retried.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Deserialize { .. } | Self::OutOfOrder { .. })
    }
}
