use crate::BatchSubmissionProvider;

use alloy_primitives::B256;
use parking_lot::Mutex;
use rollup_db::DatabaseError;
use rollup_node_primitives::{BatchSubmission, BatchSubmissionStatus};

/// An in-memory [`BatchSubmissionProvider`] recording the calls that mutate batches.
#[derive(Debug, Default)]
pub struct RecordingSubmissionProvider {
    batches: Mutex<Vec<BatchSubmission>>,
    submitted: Mutex<Vec<(u64, B256)>>,
    finalized: Mutex<Vec<u64>>,
}

impl RecordingSubmissionProvider {
    /// Stores the batch.
    pub fn push(&self, submission: BatchSubmission) {
        self.batches.lock().push(submission);
    }

    /// Returns the lowest batch that is neither submitted nor finalized.
    pub fn pending(&self) -> Option<BatchSubmission> {
        let submitted = self.submitted.lock();
        self.batches
            .lock()
            .iter()
            .filter(|b| b.status != BatchSubmissionStatus::Finalized)
            .filter(|b| b.submission_tx_hash.is_none())
            .filter(|b| !submitted.iter().any(|(n, _)| *n == b.batch_number))
            .min_by_key(|b| b.batch_number)
            .cloned()
    }

    /// Returns the `mark_submitted` calls in call order.
    pub fn marked_submitted(&self) -> Vec<(u64, B256)> {
        self.submitted.lock().clone()
    }

    /// Returns the `mark_finalized` calls in call order.
    pub fn marked_finalized(&self) -> Vec<u64> {
        self.finalized.lock().clone()
    }
}

#[async_trait::async_trait]
impl BatchSubmissionProvider for RecordingSubmissionProvider {
    async fn next_pending_batch(&self) -> Result<Option<BatchSubmission>, DatabaseError> {
        Ok(self.pending())
    }

    async fn next_submitted_batch(&self) -> Result<Option<BatchSubmission>, DatabaseError> {
        let finalized = self.finalized.lock();
        Ok(self
            .batches
            .lock()
            .iter()
            .filter(|b| b.status == BatchSubmissionStatus::Submitted)
            .filter(|b| !finalized.contains(&b.batch_number))
            .min_by_key(|b| b.batch_number)
            .cloned())
    }

    async fn mark_submitted(&self, batch_number: u64, tx_hash: B256) -> Result<(), DatabaseError> {
        self.submitted.lock().push((batch_number, tx_hash));
        Ok(())
    }

    async fn mark_finalized(&self, batch_number: u64) -> Result<(), DatabaseError> {
        self.finalized.lock().push(batch_number);
        Ok(())
    }
}
