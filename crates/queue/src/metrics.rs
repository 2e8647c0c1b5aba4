use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the [`super::OrderedPersistentQueue`].
#[derive(Metrics, Clone)]
#[metrics(scope = "queue")]
pub struct QueueMetrics {
    /// The number of items newly persisted.
    pub items_added: Counter,
    /// The number of successful handler invocations.
    pub items_handled: Counter,
    /// The number of items marked processed.
    pub items_processed: Counter,
    /// The number of failed handler invocations.
    pub handler_failures: Counter,
}
