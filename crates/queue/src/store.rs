use crate::QueueError;

use rollup_db::{Database, DatabaseOperations};
use rollup_node_primitives::QueueItem;

/// The durable storage backing an [`crate::OrderedPersistentQueue`]. All operations are scoped
/// to a queue key.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait QueueStore: Send + Sync {
    /// Inserts the payload at the index if no item is stored there. Returns true if the item was
    /// inserted.
    async fn insert_item(
        &self,
        queue_key: &str,
        index: u64,
        payload: Vec<u8>,
    ) -> Result<bool, QueueError>;

    /// Returns the item stored at the index.
    async fn get_item(
        &self,
        queue_key: &str,
        index: u64,
    ) -> Result<Option<QueueItem<Vec<u8>>>, QueueError>;

    /// Flags the item at the index as processed. Returns false if no item is stored there.
    async fn set_processed(&self, queue_key: &str, index: u64) -> Result<bool, QueueError>;

    /// Returns the highest processed index.
    async fn last_processed_index(&self, queue_key: &str) -> Result<Option<u64>, QueueError>;

    /// Returns the highest stored index, processed or not.
    async fn last_index(&self, queue_key: &str) -> Result<Option<u64>, QueueError>;
}

#[async_trait::async_trait]
impl QueueStore for Database {
    async fn insert_item(
        &self,
        queue_key: &str,
        index: u64,
        payload: Vec<u8>,
    ) -> Result<bool, QueueError> {
        let item =
            QueueItem { queue_key: queue_key.to_owned(), index, payload, processed: false };
        Ok(self.insert_queue_item(item).await?)
    }

    async fn get_item(
        &self,
        queue_key: &str,
        index: u64,
    ) -> Result<Option<QueueItem<Vec<u8>>>, QueueError> {
        Ok(self.get_queue_item(queue_key, index).await?)
    }

    async fn set_processed(&self, queue_key: &str, index: u64) -> Result<bool, QueueError> {
        Ok(self.mark_queue_item_processed(queue_key, index).await?)
    }

    async fn last_processed_index(&self, queue_key: &str) -> Result<Option<u64>, QueueError> {
        Ok(self.get_last_processed_queue_index(queue_key).await?)
    }

    async fn last_index(&self, queue_key: &str) -> Result<Option<u64>, QueueError> {
        Ok(self.get_last_queue_index(queue_key).await?)
    }
}
