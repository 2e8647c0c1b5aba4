/// The persisted position of a subscriber in a historical stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// The subscription the cursor belongs to.
    pub subscription_id: String,
    /// The last block number or index that was successfully delivered.
    pub last_processed: u64,
}

/// An item of an ordered persistent queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem<T> {
    /// The logical stream the item belongs to.
    pub queue_key: String,
    /// The position of the item in the stream.
    pub index: u64,
    /// The item payload.
    pub payload: T,
    /// Whether the item has been processed.
    pub processed: bool,
}

impl<T> QueueItem<T> {
    /// Maps the payload of the item.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueueItem<U> {
        QueueItem {
            queue_key: self.queue_key,
            index: self.index,
            payload: f(self.payload),
            processed: self.processed,
        }
    }
}
