use crate::{BatchFinalizerConfig, BatchSubmissionProvider, BatchSubmitterError, BatchSubmitterMetrics};

use rollup_node_primitives::BatchSubmissionStatus;
use rollup_node_providers::ChainReader;

/// Finalizes submitted batches whose submission transaction is buried under
/// [`BatchFinalizerConfig::finality_delay`] blocks.
#[derive(Debug)]
pub struct BatchFinalizer<P, C> {
    provider: P,
    chain: C,
    config: BatchFinalizerConfig,
    metrics: BatchSubmitterMetrics,
}

impl<P, C> BatchFinalizer<P, C>
where
    P: BatchSubmissionProvider,
    C: ChainReader,
{
    /// Returns a new [`BatchFinalizer`].
    pub fn new(provider: P, chain: C, config: BatchFinalizerConfig) -> Self {
        Self { provider, chain, config, metrics: BatchSubmitterMetrics::default() }
    }

    /// Finalizes the lowest submitted batch if it is final. Returns true if a batch was
    /// finalized.
    pub async fn run_task(&self) -> Result<bool, BatchSubmitterError> {
        let Some(submission) = self.provider.next_submitted_batch().await? else {
            return Ok(false)
        };
        let batch_number = submission.batch_number;

        if submission.status != BatchSubmissionStatus::Submitted {
            tracing::error!(target: "rollup::submitter", batch_number, status = %submission.status, "submitted batch has unexpected status");
            return Err(BatchSubmitterError::UnexpectedBatchStatus {
                batch_number,
                status: submission.status,
                expected: BatchSubmissionStatus::Submitted,
            })
        }
        let Some(tx_hash) = submission.submission_tx_hash else {
            tracing::error!(target: "rollup::submitter", batch_number, "submitted batch has no transaction hash");
            return Err(BatchSubmitterError::MissingSubmissionTransaction(batch_number))
        };

        let Some(block_number) = self
            .chain
            .transaction_receipt(tx_hash)
            .await?
            .filter(|receipt| receipt.status)
            .and_then(|receipt| receipt.block_number)
        else {
            tracing::warn!(target: "rollup::submitter", batch_number, %tx_hash, "submission receipt not found");
            return Ok(false)
        };

        let head = self.chain.block_number().await?;
        let depth = head.saturating_sub(block_number);
        if depth < self.config.finality_delay {
            tracing::trace!(target: "rollup::submitter", batch_number, depth, "batch not final yet");
            return Ok(false)
        }

        self.provider.mark_finalized(batch_number).await?;
        self.metrics.batches_finalized.increment(1);
        tracing::info!(target: "rollup::submitter", batch_number, %tx_hash, "batch finalized");
        Ok(true)
    }
}
