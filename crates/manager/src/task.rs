use crate::TaskError;

use rollup_node_batch_submitter::{BatchFinalizer, BatchSubmissionProvider, BatchSubmitter};
use rollup_node_fraud_detector::{
    FraudDetector, FraudReporter, VerificationDataProvider, VerificationOutcome,
};
use rollup_node_providers::{ChainReader, TransactionSubmitter};

/// A unit of periodic work driven by the [`crate::TaskScheduler`].
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait ScheduledTask: Send + Sync {
    /// Returns the name of the task, used in logs, metrics and commands.
    fn name(&self) -> &'static str;

    /// Runs the task once. Returns true if work was done and more may be pending.
    async fn run_task(&self) -> Result<bool, TaskError>;
}

#[async_trait::async_trait]
impl<P, R> ScheduledTask for FraudDetector<P, R>
where
    P: VerificationDataProvider,
    R: FraudReporter,
{
    fn name(&self) -> &'static str {
        "fraud_detector"
    }

    async fn run_task(&self) -> Result<bool, TaskError> {
        Ok(matches!(Self::run_task(self).await?, VerificationOutcome::Verified(_)))
    }
}

#[async_trait::async_trait]
impl<P, C> ScheduledTask for BatchSubmitter<P, C>
where
    P: BatchSubmissionProvider,
    C: ChainReader + TransactionSubmitter,
{
    fn name(&self) -> &'static str {
        "batch_submitter"
    }

    async fn run_task(&self) -> Result<bool, TaskError> {
        Ok(Self::run_task(self).await?)
    }
}

#[async_trait::async_trait]
impl<P, C> ScheduledTask for BatchFinalizer<P, C>
where
    P: BatchSubmissionProvider,
    C: ChainReader,
{
    fn name(&self) -> &'static str {
        "batch_finalizer"
    }

    async fn run_task(&self) -> Result<bool, TaskError> {
        Ok(Self::run_task(self).await?)
    }
}
