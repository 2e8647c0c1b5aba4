use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::BatchSubmitter`] and [`super::BatchFinalizer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "batch_submitter")]
pub struct BatchSubmitterMetrics {
    /// The number of batches submitted with a successful receipt.
    pub batches_submitted: Counter,
    /// The number of submissions with a failed receipt.
    pub failed_receipts: Counter,
    /// The duration from sending the submission to its receipt.
    pub submission_duration: Histogram,
    /// The number of finalized batches.
    pub batches_finalized: Counter,
}
