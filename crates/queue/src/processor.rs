use crate::{BoxError, QueueError};

use std::{fmt, future::Future, sync::Arc};

use futures::future::BoxFuture;

type SerializeFn<T> = dyn Fn(&T) -> Result<Vec<u8>, BoxError> + Send + Sync;
type DeserializeFn<T> = dyn Fn(&[u8]) -> Result<T, BoxError> + Send + Sync;
type HandleFn<T> = dyn Fn(QueueEntry<T>) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync;

/// The injected behavior of an [`crate::OrderedPersistentQueue`]: how payloads are serialized
/// for the store, how they are read back, and how the next item is handled.
pub struct QueueProcessor<T> {
    serialize: Arc<SerializeFn<T>>,
    deserialize: Arc<DeserializeFn<T>>,
    handle: Arc<HandleFn<T>>,
}

impl<T> QueueProcessor<T> {
    /// Returns a new [`QueueProcessor`] from the three functions.
    ///
    /// The handler is not expected to mark the item processed before returning. It signals
    /// completion through the entry's [`Completion`], now or later.
    pub fn new<S, D, H, Fut>(serialize: S, deserialize: D, handle: H) -> Self
    where
        S: Fn(&T) -> Result<Vec<u8>, BoxError> + Send + Sync + 'static,
        D: Fn(&[u8]) -> Result<T, BoxError> + Send + Sync + 'static,
        H: Fn(QueueEntry<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self {
            serialize: Arc::new(serialize),
            deserialize: Arc::new(deserialize),
            handle: Arc::new(move |entry| Box::pin(handle(entry))),
        }
    }

    pub(crate) fn serialize(&self, item: &T) -> Result<Vec<u8>, BoxError> {
        (self.serialize)(item)
    }

    pub(crate) fn deserialize(&self, bytes: &[u8]) -> Result<T, BoxError> {
        (self.deserialize)(bytes)
    }

    pub(crate) fn handle(&self, entry: QueueEntry<T>) -> BoxFuture<'static, Result<(), BoxError>> {
        (self.handle)(entry)
    }
}

impl<T> Clone for QueueProcessor<T> {
    fn clone(&self) -> Self {
        Self {
            serialize: self.serialize.clone(),
            deserialize: self.deserialize.clone(),
            handle: self.handle.clone(),
        }
    }
}

impl<T> fmt::Debug for QueueProcessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueProcessor").finish_non_exhaustive()
    }
}

/// Marks items of a queue processed.
pub(crate) trait MarkProcessed: Send + Sync {
    fn mark_processed(self: Arc<Self>, index: u64) -> BoxFuture<'static, Result<(), QueueError>>;
}

/// The completion signal of a handled item.
pub struct Completion {
    index: u64,
    queue: Arc<dyn MarkProcessed>,
}

impl Completion {
    pub(crate) fn new(index: u64, queue: Arc<dyn MarkProcessed>) -> Self {
        Self { index, queue }
    }

    /// Returns the index of the item.
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Marks the item processed, letting the queue advance to the next index.
    pub async fn mark_processed(self) -> Result<(), QueueError> {
        self.queue.mark_processed(self.index).await
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").field("index", &self.index).finish_non_exhaustive()
    }
}

/// An item handed to the handler of a queue.
#[derive(Debug)]
pub struct QueueEntry<T> {
    /// The index of the item.
    pub index: u64,
    /// The deserialized payload.
    pub payload: T,
    /// The completion signal for the item.
    pub completion: Completion,
}
