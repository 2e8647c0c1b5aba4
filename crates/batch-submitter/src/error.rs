use rollup_codec::CodecError;
use rollup_db::DatabaseError;
use rollup_node_primitives::BatchSubmissionStatus;
use rollup_node_providers::ProviderError;

/// An error that occurred while submitting or finalizing batches.
#[derive(Debug, thiserror::Error)]
pub enum BatchSubmitterError {
    /// An error occurred while interacting with the database.
    #[error("batch submission failed due to database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    /// An error occurred while interacting with the base chain.
    #[error("batch submission failed due to provider error: {0}")]
    Provider(#[from] ProviderError),
    /// The batch could not be encoded.
    #[error("failed to encode batch {batch_number}: {source}")]
    Codec {
        /// The batch number.
        batch_number: u64,
        /// The codec error.
        source: CodecError,
    },
    /// The batch provided for a step does not have the status of that step.
    #[error("unexpected status {status} of batch {batch_number}, expected {expected}")]
    UnexpectedBatchStatus {
        /// The batch number.
        batch_number: u64,
        /// The status of the batch.
        status: BatchSubmissionStatus,
        /// The status the step operates on.
        expected: BatchSubmissionStatus,
    },
    /// A submitted batch holds no submission transaction hash.
    #[error("submitted batch {0} has no submission transaction")]
    MissingSubmissionTransaction(u64),
}

impl BatchSubmitterError {
    /// Returns true if the error is an invariant violation that retrying cannot fix.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Codec { .. } |
                Self::UnexpectedBatchStatus { .. } |
                Self::MissingSubmissionTransaction(_)
        )
    }
}
