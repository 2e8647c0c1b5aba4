use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// The metrics for the [`super::FraudDetector`].
#[derive(Metrics, Clone)]
#[metrics(scope = "fraud_detector")]
pub struct FraudDetectorMetrics {
    /// The number of verified batches.
    pub batches_verified: Counter,
    /// The number of frauds reported for the first time.
    pub frauds_detected: Counter,
    /// The number of reports of an unresolved fraud.
    pub realerts: Counter,
    /// The last verified batch number.
    pub last_verified_batch: Gauge,
}
