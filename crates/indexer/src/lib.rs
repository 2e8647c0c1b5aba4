//! The base chain indexer of the rollup node.
//!
//! Chain events delivered by the watcher are first persisted to an ordered queue, then handled
//! one at a time: sequencer batches are decoded from the calldata of their appending transaction
//! and committed state roots are stored for verification.

mod error;
pub use error::IndexerError;

mod event;
pub use event::IndexerEvent;

mod handler;
pub use handler::L1LogHandler;

mod metrics;
pub use metrics::{IndexerItem, IndexerMetrics};

mod persister;
pub use persister::ChainDataPersister;

use std::sync::Arc;

use alloy_primitives::B256;
use rollup_db::{Database, DatabaseOperations};
use rollup_node_primitives::ChainEvent;
use rollup_node_providers::{ChainReader, NewHeadsProvider};
use rollup_node_queue::{
    BoxError, KeyedLock, OrderedPersistentQueue, QueueConfig, QueueEntry, QueueProcessor,
};
use rollup_node_watcher::{ChainEventWatcher, CursorStore, WatchTarget};
use tokio::sync::mpsc;

/// The prefix of the queue keys used by the indexer.
const QUEUE_KEY_PREFIX: &str = "indexer";

/// The indexer, which persists and handles the chain events of the watched targets.
#[derive(Debug)]
pub struct Indexer<R> {
    database: Database,
    handler: Arc<L1LogHandler<R>>,
    config: QueueConfig,
    locks: Arc<KeyedLock>,
}

impl<R: ChainReader + 'static> Indexer<R> {
    /// Returns a new [`Indexer`] and the receiver of its events.
    pub fn new(
        reader: R,
        database: Database,
        config: QueueConfig,
    ) -> (Self, mpsc::UnboundedReceiver<IndexerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handler = Arc::new(L1LogHandler::new(reader, database.clone(), events_tx));
        let indexer = Self { database, handler, config, locks: Arc::new(KeyedLock::new()) };
        (indexer, events_rx)
    }

    /// Returns the queue key of the target.
    pub fn queue_key(target: &WatchTarget) -> String {
        format!("{QUEUE_KEY_PREFIX}:{}", target.subscription_id())
    }

    /// Returns a [`ChainDataPersister`] appending the events of the target to its queue.
    pub fn persister(&self, target: &WatchTarget) -> Arc<ChainDataPersister<Database>> {
        let handler = self.handler.clone();
        let processor = QueueProcessor::new(
            |event: &ChainEvent| serde_json::to_vec(event).map_err(Into::into),
            |bytes: &[u8]| serde_json::from_slice(bytes).map_err(Into::into),
            move |entry: QueueEntry<ChainEvent>| {
                let handler = handler.clone();
                async move { handler.handle_entry(entry).await.map_err(BoxError::from) }
            },
        );
        let queue = OrderedPersistentQueue::with_locks(
            Self::queue_key(target),
            self.database.clone(),
            processor,
            self.config,
            self.locks.clone(),
        );
        Arc::new(ChainDataPersister::new(queue))
    }

    /// Resumes the queue of the target, then subscribes its persister to the watcher with a
    /// catch-up sync.
    pub async fn watch<P, C>(
        &self,
        watcher: &ChainEventWatcher<P, C>,
        target: WatchTarget,
    ) -> Result<Arc<ChainDataPersister<Database>>, IndexerError>
    where
        P: ChainReader + NewHeadsProvider + 'static,
        C: CursorStore + 'static,
    {
        let persister = self.persister(&target);
        persister.queue().resume().await?;
        tracing::info!(target: "rollup::indexer", %target, "indexing target");
        watcher.subscribe(target, persister.clone(), true).await;
        Ok(persister)
    }

    /// Stores the state roots computed by executing the transactions of the batch, starting at
    /// the index in the batch.
    pub async fn insert_computed_state_roots(
        &self,
        batch_number: u64,
        start_index: u64,
        roots: Vec<B256>,
    ) -> Result<(), IndexerError> {
        tracing::trace!(target: "rollup::indexer", batch_number, start_index, count = roots.len(), "inserting computed state roots");
        Ok(self.database.insert_computed_state_roots(batch_number, start_index, roots).await?)
    }
}
