use alloy_primitives::B256;
use rollup_db::DatabaseError;
use rollup_node_providers::ProviderError;
use rollup_node_queue::QueueError;

/// A type that represents an error that occurred during indexing.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// An error occurred while interacting with the database.
    #[error("indexing failed due to database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    /// An error occurred in the ordered queue.
    #[error("indexing failed due to queue error: {0}")]
    Queue(#[from] QueueError),
    /// An error occurred while fetching data from the base chain.
    #[error("indexing failed due to provider error: {0}")]
    Provider(#[from] ProviderError),
    /// The transaction that emitted a log is unknown to the provider.
    #[error("transaction {0} not found")]
    MissingTransaction(B256),
    /// The indexer event channel was closed.
    #[error("indexer event channel closed")]
    EventChannelClosed,
}
