use crate::{
    lock::KeySlot,
    processor::MarkProcessed, BoxError, Completion, KeyedLock, QueueConfig, QueueEntry,
    QueueError, QueueMetrics, QueueProcessor, QueueStore,
};

use std::{fmt, sync::Arc};

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

/// A durable queue of items keyed by a monotonic index.
///
/// Items are handed to the processor's handler in strict ascending index order, with at most one
/// handler invocation active per queue key. An item is handled once its predecessor is marked
/// processed, and a failed handler invocation is retried after a backoff until it succeeds. No
/// index is ever skipped.
pub struct OrderedPersistentQueue<T, S> {
    inner: Arc<QueueInner<T, S>>,
}

struct QueueInner<T, S> {
    queue_key: String,
    store: S,
    processor: QueueProcessor<T>,
    /// The lock and in-flight index of the queue key, shared by every queue on the registry.
    slot: Arc<KeySlot>,
    config: QueueConfig,
    metrics: QueueMetrics,
}

/// The outcome of one attempt at handling an item.
enum Attempt {
    NotReady,
    Handled,
    Failed(BoxError),
}

impl<T, S> Clone for OrderedPersistentQueue<T, S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T, S> fmt::Debug for OrderedPersistentQueue<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedPersistentQueue")
            .field("queue_key", &self.inner.queue_key)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<T, S> OrderedPersistentQueue<T, S>
where
    T: Send + Sync + 'static,
    S: QueueStore + 'static,
{
    /// Returns a new queue for the key, with its own lock registry.
    pub fn new(
        queue_key: impl Into<String>,
        store: S,
        processor: QueueProcessor<T>,
        config: QueueConfig,
    ) -> Self {
        Self::with_locks(queue_key, store, processor, config, Arc::new(KeyedLock::new()))
    }

    /// Returns a new queue for the key, sharing the lock registry. Queues built on the same
    /// registry and key exclude each other and never hand out an item another one is still
    /// awaiting completion of.
    pub fn with_locks(
        queue_key: impl Into<String>,
        store: S,
        processor: QueueProcessor<T>,
        config: QueueConfig,
        locks: Arc<KeyedLock>,
    ) -> Self {
        let queue_key = queue_key.into();
        let metrics = QueueMetrics::new_with_labels(&[("queue_key", queue_key.clone())]);
        let slot = locks.slot(&queue_key);
        Self {
            inner: Arc::new(QueueInner {
                queue_key,
                store,
                processor,
                slot,
                config,
                metrics,
            }),
        }
    }

    /// Returns the key of the queue.
    pub fn queue_key(&self) -> &str {
        &self.inner.queue_key
    }

    /// Persists the item at the index, then attempts to handle it in the background if it is
    /// next. Adding an index that is already stored is a no-op. Returns true if the item was
    /// newly persisted.
    pub async fn add(&self, index: u64, item: &T) -> Result<bool, QueueError> {
        let inner = &self.inner;
        let payload =
            inner.processor.serialize(item).map_err(|source| QueueError::Serialize { index, source })?;
        let inserted = inner.store.insert_item(&inner.queue_key, index, payload).await?;
        if inserted {
            inner.metrics.items_added.increment(1);
            tracing::trace!(target: "rollup::queue", queue_key = %inner.queue_key, index, "added item");
        } else {
            tracing::trace!(target: "rollup::queue", queue_key = %inner.queue_key, index, "item already stored");
        }

        spawn_handle(inner.clone(), index);
        Ok(inserted)
    }

    /// Marks the item at the index processed, then attempts to handle the next index in the
    /// background. Fails if the predecessor of the index is not processed.
    pub async fn mark_processed(&self, index: u64) -> Result<(), QueueError> {
        self.inner.clone().mark_processed(index).await
    }

    /// Returns the highest processed index, [`None`] if no item was processed.
    pub async fn last_index_processed(&self) -> Result<Option<u64>, QueueError> {
        self.inner.store.last_processed_index(&self.inner.queue_key).await
    }

    /// Returns the item stored at the highest index, processed or not.
    pub async fn last_item(&self) -> Result<Option<(u64, T)>, QueueError> {
        let inner = &self.inner;
        let Some(index) = inner.store.last_index(&inner.queue_key).await? else { return Ok(None) };
        let Some(item) = inner.store.get_item(&inner.queue_key, index).await? else {
            return Err(QueueError::ItemNotFound(index))
        };
        let payload = inner
            .processor
            .deserialize(&item.payload)
            .map_err(|source| QueueError::Deserialize { index, source })?;
        Ok(Some((index, payload)))
    }

    /// Starts handling at the index following the last processed one. Used after a restart.
    pub async fn resume(&self) -> Result<JoinHandle<()>, QueueError> {
        let next = self.last_index_processed().await?.map_or(0, |last| last + 1);
        tracing::info!(target: "rollup::queue", queue_key = %self.inner.queue_key, next, "resuming queue");
        Ok(spawn_handle(self.inner.clone(), next))
    }

    /// Handles the item at the index if it is the next one, retrying failed handler invocations
    /// until one succeeds. Returns once the item was handled or is found not to be ready.
    pub async fn try_handle(&self, index: u64) -> Result<(), QueueError> {
        self.inner.clone().try_handle(index).await
    }
}

fn spawn_handle<T, S>(inner: Arc<QueueInner<T, S>>, index: u64) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
    S: QueueStore + 'static,
{
    tokio::spawn(async move {
        let queue_key = inner.queue_key.clone();
        if let Err(err) = inner.try_handle(index).await {
            tracing::error!(target: "rollup::queue", %queue_key, index, %err, "failed to handle queue item");
        }
    })
}

/// Returns true if `index` directly follows `last_processed`.
const fn is_next(last_processed: Option<u64>, index: u64) -> bool {
    match last_processed {
        None => index == 0,
        Some(last) => last < index && index - last == 1,
    }
}

impl<T, S> QueueInner<T, S>
where
    T: Send + Sync + 'static,
    S: QueueStore + 'static,
{
    async fn try_handle(self: Arc<Self>, index: u64) -> Result<(), QueueError> {
        loop {
            match self.clone().attempt(index).await {
                Ok(Attempt::NotReady | Attempt::Handled) => return Ok(()),
                Ok(Attempt::Failed(err)) => {
                    self.metrics.handler_failures.increment(1);
                    tracing::warn!(target: "rollup::queue", queue_key = %self.queue_key, index, %err, "handler failed, retrying");
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::warn!(target: "rollup::queue", queue_key = %self.queue_key, index, %err, "queue store error, retrying");
                }
            }
            tokio::time::sleep(self.config.retry_backoff).await;
        }
    }

    /// Attempts to handle the item under the lock of the queue key.
    async fn attempt(self: Arc<Self>, index: u64) -> Result<Attempt, QueueError> {
        let _guard = self.slot.lock().await;

        let last_processed = self.store.last_processed_index(&self.queue_key).await?;
        if !is_next(last_processed, index) {
            tracing::trace!(target: "rollup::queue", queue_key = %self.queue_key, index, ?last_processed, "item not next");
            return Ok(Attempt::NotReady);
        }
        if self.slot.awaiting_completion() == Some(index) {
            return Ok(Attempt::NotReady);
        }
        let Some(item) = self.store.get_item(&self.queue_key, index).await? else {
            tracing::trace!(target: "rollup::queue", queue_key = %self.queue_key, index, "item not added yet");
            return Ok(Attempt::NotReady);
        };

        let payload = self
            .processor
            .deserialize(&item.payload)
            .map_err(|source| QueueError::Deserialize { index, source })?;
        let completion = Completion::new(index, self.clone() as Arc<dyn MarkProcessed>);
        let entry = QueueEntry { index, payload, completion };

        self.slot.set_awaiting_completion(index);
        match self.processor.handle(entry).await {
            Ok(()) => {
                self.metrics.items_handled.increment(1);
                tracing::debug!(target: "rollup::queue", queue_key = %self.queue_key, index, "handled item");
                Ok(Attempt::Handled)
            }
            Err(err) => {
                self.slot.clear_awaiting_completion(index);
                Ok(Attempt::Failed(err))
            }
        }
    }
}

impl<T, S> MarkProcessed for QueueInner<T, S>
where
    T: Send + Sync + 'static,
    S: QueueStore + 'static,
{
    fn mark_processed(self: Arc<Self>, index: u64) -> BoxFuture<'static, Result<(), QueueError>> {
        Box::pin(async move {
            let last_processed = self.store.last_processed_index(&self.queue_key).await?;
            if last_processed.is_some_and(|last| last >= index) {
                return Ok(());
            }
            if !is_next(last_processed, index) {
                tracing::error!(target: "rollup::queue", queue_key = %self.queue_key, index, ?last_processed, "item marked processed out of order");
                return Err(QueueError::OutOfOrder { index, last_processed });
            }
            if !self.store.set_processed(&self.queue_key, index).await? {
                return Err(QueueError::ItemNotFound(index));
            }

            self.slot.clear_awaiting_completion(index);
            self.metrics.items_processed.increment(1);
            tracing::trace!(target: "rollup::queue", queue_key = %self.queue_key, index, "marked item processed");

            spawn_handle(self, index.saturating_add(1));
            Ok(())
        })
    }
}
