//! A durable work queue that hands items to a handler in strict index order, one at a time per
//! queue key.

mod config;
pub use config::{QueueConfig, DEFAULT_RETRY_BACKOFF};

mod error;
pub use error::{BoxError, QueueError};

mod lock;
pub use lock::KeyedLock;

mod metrics;
pub use metrics::QueueMetrics;

mod processor;
pub use processor::{Completion, QueueEntry, QueueProcessor};

mod queue;
pub use queue::OrderedPersistentQueue;

mod store;
pub use store::QueueStore;
