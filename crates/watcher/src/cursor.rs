use crate::WatcherError;

use rollup_db::{Database, DatabaseOperations};
use rollup_node_primitives::Cursor;

/// The persisted positions of the watcher subscriptions.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait CursorStore: Send + Sync {
    /// Returns the last block delivered for the subscription.
    async fn get_cursor(&self, subscription_id: &str) -> Result<Option<u64>, WatcherError>;

    /// Persists the last block delivered for the subscription.
    async fn set_cursor(&self, cursor: Cursor) -> Result<(), WatcherError>;
}

#[async_trait::async_trait]
impl CursorStore for Database {
    async fn get_cursor(&self, subscription_id: &str) -> Result<Option<u64>, WatcherError> {
        Ok(DatabaseOperations::get_cursor(self, subscription_id).await?)
    }

    async fn set_cursor(&self, cursor: Cursor) -> Result<(), WatcherError> {
        Ok(DatabaseOperations::set_cursor(self, cursor).await?)
    }
}
