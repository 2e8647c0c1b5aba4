use rollup_node_batch_submitter::BatchSubmitterError;
use rollup_node_fraud_detector::FraudDetectorError;

/// A boxed task error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by a [`crate::ScheduledTask`] run.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The task cannot make progress. The scheduler shuts down.
    #[error("fatal: {0}")]
    Fatal(BoxError),
    /// The run failed. The task runs again on its next period.
    #[error("transient: {0}")]
    Transient(BoxError),
}

impl TaskError {
    /// Returns true if the error shuts the scheduler down.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

impl From<FraudDetectorError> for TaskError {
    fn from(err: FraudDetectorError) -> Self {
        if err.is_fatal() {
            Self::Fatal(err.into())
        } else {
            Self::Transient(err.into())
        }
    }
}

impl From<BatchSubmitterError> for TaskError {
    fn from(err: BatchSubmitterError) -> Self {
        if err.is_fatal() {
            Self::Fatal(err.into())
        } else {
            Self::Transient(err.into())
        }
    }
}
