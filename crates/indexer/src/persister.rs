use rollup_node_primitives::ChainEvent;
use rollup_node_queue::{OrderedPersistentQueue, QueueStore};
use rollup_node_watcher::{EventHandler, HandlerError};
use tokio::{sync::Mutex, task::JoinHandle};

/// The position of the last persisted event and its queue index.
#[derive(Debug, Default)]
struct Tail {
    loaded: bool,
    last: Option<(u64, (u64, u64))>,
}

/// An [`EventHandler`] that appends the delivered chain events to an ordered queue.
///
/// The watcher redelivers the events of a block whose cursor was not persisted before a restart.
/// Those events are recognized by their position and not appended twice.
#[derive(Debug)]
pub struct ChainDataPersister<S> {
    queue: OrderedPersistentQueue<ChainEvent, S>,
    tail: Mutex<Tail>,
}

impl<S: QueueStore + 'static> ChainDataPersister<S> {
    /// Returns a new [`ChainDataPersister`] appending to the queue.
    pub fn new(queue: OrderedPersistentQueue<ChainEvent, S>) -> Self {
        Self { queue, tail: Mutex::new(Tail::default()) }
    }

    /// Returns the queue the events are appended to.
    pub const fn queue(&self) -> &OrderedPersistentQueue<ChainEvent, S> {
        &self.queue
    }

    /// Resumes the handling of the persisted events that were not processed yet.
    pub async fn resume(&self) -> Result<JoinHandle<()>, HandlerError> {
        Ok(self.queue.resume().await?)
    }
}

#[async_trait::async_trait]
impl<S: QueueStore + 'static> EventHandler for ChainDataPersister<S> {
    async fn handle(&self, event: &ChainEvent) -> Result<(), HandlerError> {
        let mut tail = self.tail.lock().await;
        if !tail.loaded {
            tail.last = self.queue.last_item().await?.map(|(index, event)| (index, event.position()));
            tail.loaded = true;
        }

        let position = event.position();
        let index = match tail.last {
            Some((_, last)) if position <= last => {
                tracing::trace!(target: "rollup::indexer", ?position, "skipping persisted event");
                return Ok(())
            }
            Some((index, _)) => index + 1,
            None => 0,
        };

        self.queue.add(index, event).await?;
        tail.last = Some((index, position));
        Ok(())
    }

    async fn on_sync_completed(&self, subscription_id: &str) {
        tracing::info!(target: "rollup::indexer", %subscription_id, "indexer synced");
    }
}
