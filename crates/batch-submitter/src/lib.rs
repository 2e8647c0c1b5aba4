//! The batch submitter of the rollup node.
//!
//! Queued batches are appended to the canonical transaction chain one at a time, lowest batch
//! number first. A batch is marked submitted only once its submission transaction executed
//! successfully, and marked finalized by the [`BatchFinalizer`] once that transaction is buried
//! deep enough.

mod config;
pub use config::{
    BatchFinalizerConfig, BatchSubmitterConfig, DEFAULT_FINALITY_DELAY,
    DEFAULT_RECEIPT_POLL_INTERVAL, DEFAULT_RECEIPT_TIMEOUT,
};

mod error;
pub use error::BatchSubmitterError;

mod finalizer;
pub use finalizer::BatchFinalizer;

mod metrics;
pub use metrics::BatchSubmitterMetrics;

mod provider;
pub use provider::BatchSubmissionProvider;

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;

use std::time::Instant;

use rollup_codec::BatchCodec;
use rollup_node_primitives::BatchSubmissionStatus;
use rollup_node_providers::{wait_for_receipt, ChainReader, TransactionSubmitter};

/// The batch submitter.
#[derive(Debug)]
pub struct BatchSubmitter<P, C> {
    provider: P,
    chain: C,
    config: BatchSubmitterConfig,
    metrics: BatchSubmitterMetrics,
}

impl<P, C> BatchSubmitter<P, C>
where
    P: BatchSubmissionProvider,
    C: ChainReader + TransactionSubmitter,
{
    /// Returns a new [`BatchSubmitter`].
    pub fn new(provider: P, chain: C, config: BatchSubmitterConfig) -> Self {
        Self { provider, chain, config, metrics: BatchSubmitterMetrics::default() }
    }

    /// Submits the next queued batch and waits for its receipt. Returns true if a batch was
    /// submitted and its transaction succeeded.
    ///
    /// A failed transaction leaves the batch queued for the next run.
    pub async fn run_task(&self) -> Result<bool, BatchSubmitterError> {
        let Some(submission) = self.provider.next_pending_batch().await? else {
            tracing::trace!(target: "rollup::submitter", "no pending batch");
            return Ok(false)
        };
        let batch_number = submission.batch_number;

        if submission.status != BatchSubmissionStatus::Queued {
            tracing::error!(target: "rollup::submitter", batch_number, status = %submission.status, "pending batch has unexpected status");
            return Err(BatchSubmitterError::UnexpectedBatchStatus {
                batch_number,
                status: submission.status,
                expected: BatchSubmissionStatus::Queued,
            })
        }

        let calldata = BatchCodec::encode_append_sequencer_batch(&submission.batch)
            .map_err(|source| BatchSubmitterError::Codec { batch_number, source })?;

        let start = Instant::now();
        let tx_hash = self.chain.send_transaction(self.config.contract_address, calldata).await?;
        tracing::info!(target: "rollup::submitter", batch_number, %tx_hash, "sent batch submission");

        let receipt = wait_for_receipt(
            &self.chain,
            tx_hash,
            self.config.receipt_poll_interval,
            self.config.receipt_timeout,
        )
        .await?;
        self.metrics.submission_duration.record(start.elapsed().as_secs_f64());

        if !receipt.status {
            self.metrics.failed_receipts.increment(1);
            tracing::warn!(target: "rollup::submitter", batch_number, %tx_hash, "batch submission reverted");
            return Ok(false)
        }

        self.provider.mark_submitted(batch_number, tx_hash).await?;
        self.metrics.batches_submitted.increment(1);
        tracing::info!(target: "rollup::submitter", batch_number, %tx_hash, block_number = ?receipt.block_number, "batch submitted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingSubmissionProvider;
    use alloy_primitives::{bytes, Address};
    use rollup_node_primitives::{BatchContext, BatchSubmission, EncodedBatch};
    use rollup_node_providers::{test_utils::MockChain, ProviderError};
    use std::sync::Arc;

    const CTC: Address = Address::repeat_byte(0xc7);

    fn submission(batch_number: u64, status: BatchSubmissionStatus) -> BatchSubmission {
        BatchSubmission {
            batch_number,
            status,
            batch: EncodedBatch {
                should_start_at_batch: batch_number,
                total_elements_to_append: 1,
                contexts: vec![BatchContext {
                    num_sequenced_transactions: 1,
                    num_subsequent_queue_transactions: 0,
                    timestamp: 1_700_000_000,
                    block_number: 10,
                }],
                transactions: vec![bytes!("01020304")],
            },
            submission_tx_hash: None,
        }
    }

    fn submitter(
        chain: &MockChain,
    ) -> (BatchSubmitter<Arc<RecordingSubmissionProvider>, MockChain>, Arc<RecordingSubmissionProvider>)
    {
        let provider = Arc::new(RecordingSubmissionProvider::default());
        let submitter =
            BatchSubmitter::new(provider.clone(), chain.clone(), BatchSubmitterConfig::new(CTC));
        (submitter, provider)
    }

    #[tokio::test]
    async fn test_successful_receipt_marks_batch_submitted() -> eyre::Result<()> {
        // Given
        let chain = MockChain::new().with_auto_mine();
        let (submitter, provider) = submitter(&chain);
        provider.push(submission(7, BatchSubmissionStatus::Queued));

        // When
        let submitted = submitter.run_task().await?;

        // Then
        assert!(submitted);
        let sent = chain.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, CTC);
        assert_eq!(
            sent[0].1,
            BatchCodec::encode_append_sequencer_batch(&submission(7, BatchSubmissionStatus::Queued).batch)?
        );
        let marked = provider.marked_submitted();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].0, 7);
        assert_eq!(chain.transaction_receipt(marked[0].1).await?.map(|r| r.status), Some(true));
        assert!(provider.marked_finalized().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_receipt_leaves_batch_pending() -> eyre::Result<()> {
        // Given
        let chain = MockChain::new().with_auto_mine();
        chain.set_receipt_status(false);
        let (submitter, provider) = submitter(&chain);
        provider.push(submission(7, BatchSubmissionStatus::Queued));

        // When
        let submitted = submitter.run_task().await?;

        // Then
        assert!(!submitted);
        assert!(provider.marked_submitted().is_empty());
        assert!(provider.marked_finalized().is_empty());
        assert_eq!(provider.pending().map(|s| s.batch_number), Some(7));

        Ok(())
    }

    #[tokio::test]
    async fn test_receipt_query_error_does_not_resubmit() -> eyre::Result<()> {
        // Given
        let chain = MockChain::new().with_auto_mine();
        chain.fail_next_receipt_queries(2);
        let (submitter, provider) = submitter(&chain);
        provider.push(submission(7, BatchSubmissionStatus::Queued));

        // When
        let submitted = submitter.run_task().await?;

        // Then
        assert!(submitted);
        assert_eq!(chain.sent_transactions().len(), 1);
        assert_eq!(provider.marked_submitted().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_no_pending_batch() -> eyre::Result<()> {
        let chain = MockChain::new().with_auto_mine();
        let (submitter, _) = submitter(&chain);
        assert!(!submitter.run_task().await?);
        assert!(chain.sent_transactions().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unexpected_status_is_fatal() {
        // Given
        let chain = MockChain::new().with_auto_mine();
        let (submitter, provider) = submitter(&chain);
        provider.push(submission(3, BatchSubmissionStatus::Submitted));

        // When
        let err = submitter.run_task().await.unwrap_err();

        // Then
        assert!(matches!(
            err,
            BatchSubmitterError::UnexpectedBatchStatus {
                batch_number: 3,
                status: BatchSubmissionStatus::Submitted,
                ..
            }
        ));
        assert!(err.is_fatal());
        assert!(chain.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_timeout_is_transient() {
        // Given
        let chain = MockChain::new().with_auto_mine();
        chain.set_withhold_receipts(true);
        let (submitter, provider) = submitter(&chain);
        provider.push(submission(1, BatchSubmissionStatus::Queued));

        // When
        let err = submitter.run_task().await.unwrap_err();

        // Then
        assert!(matches!(err, BatchSubmitterError::Provider(ProviderError::Timeout(_))));
        assert!(!err.is_fatal());
        assert!(provider.marked_submitted().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_is_transient() {
        let chain = MockChain::new().with_auto_mine();
        chain.set_send_failure(Some("nonce too low"));
        let (submitter, provider) = submitter(&chain);
        provider.push(submission(1, BatchSubmissionStatus::Queued));

        let err = submitter.run_task().await.unwrap_err();

        assert!(matches!(err, BatchSubmitterError::Provider(ProviderError::Other(_))));
        assert!(!err.is_fatal());
    }
}
