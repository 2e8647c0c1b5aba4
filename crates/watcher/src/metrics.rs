use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the [`super::ChainEventWatcher`].
#[derive(Metrics, Clone)]
#[metrics(scope = "watcher")]
pub struct WatcherMetrics {
    /// A counter on the blocks dispatched.
    pub blocks_dispatched: Counter,
    /// A counter on the logs dispatched.
    pub logs_dispatched: Counter,
    /// A counter on the retried fetches and cursor writes.
    pub fetch_retries: Counter,
    /// A counter on the watchers stopped by a fatal error.
    pub fatal_errors: Counter,
}
