use alloy_primitives::B256;
use rollup_db::{Database, DatabaseError, DatabaseOperations};
use rollup_node_primitives::{BatchSubmission, BatchSubmissionStatus};

/// Provides the outgoing batches and records their submission state.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait BatchSubmissionProvider: Send + Sync {
    /// Returns the next batch to submit.
    async fn next_pending_batch(&self) -> Result<Option<BatchSubmission>, DatabaseError>;

    /// Returns the next submitted batch that is not finalized.
    async fn next_submitted_batch(&self) -> Result<Option<BatchSubmission>, DatabaseError>;

    /// Marks the batch submitted by the transaction.
    async fn mark_submitted(&self, batch_number: u64, tx_hash: B256) -> Result<(), DatabaseError>;

    /// Marks the batch finalized.
    async fn mark_finalized(&self, batch_number: u64) -> Result<(), DatabaseError>;
}

#[async_trait::async_trait]
impl BatchSubmissionProvider for Database {
    async fn next_pending_batch(&self) -> Result<Option<BatchSubmission>, DatabaseError> {
        self.get_first_batch_submission_with_status(BatchSubmissionStatus::Queued).await
    }

    async fn next_submitted_batch(&self) -> Result<Option<BatchSubmission>, DatabaseError> {
        self.get_first_batch_submission_with_status(BatchSubmissionStatus::Submitted).await
    }

    async fn mark_submitted(
        &self,
        batch_number: u64,
        tx_hash: B256,
    ) -> Result<(), DatabaseError> {
        self.mark_batch_submitted(batch_number, tx_hash).await
    }

    async fn mark_finalized(&self, batch_number: u64) -> Result<(), DatabaseError> {
        self.mark_batch_finalized(batch_number).await
    }
}
