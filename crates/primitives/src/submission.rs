use crate::{EncodedBatch, RollupNodePrimitiveError};
use alloy_primitives::B256;
use std::str::FromStr;

/// The lifecycle status of an outgoing batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchSubmissionStatus {
    /// The batch is waiting to be submitted.
    Queued,
    /// The batch submission transaction was confirmed.
    Submitted,
    /// The batch submission is final.
    Finalized,
}

impl BatchSubmissionStatus {
    /// Returns the string representation of the status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Submitted => "submitted",
            Self::Finalized => "finalized",
        }
    }
}

impl core::fmt::Display for BatchSubmissionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchSubmissionStatus {
    type Err = RollupNodePrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "submitted" => Ok(Self::Submitted),
            "finalized" => Ok(Self::Finalized),
            _ => Err(RollupNodePrimitiveError::UnknownBatchStatus),
        }
    }
}

/// An outgoing batch and its submission state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSubmission {
    /// The batch number.
    pub batch_number: u64,
    /// The submission status.
    pub status: BatchSubmissionStatus,
    /// The batch to submit.
    pub batch: EncodedBatch,
    /// The hash of the submission transaction, once submitted.
    pub submission_tx_hash: Option<B256>,
}

/// The receipt of a base chain transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// The transaction hash.
    pub transaction_hash: B256,
    /// The number of the block including the transaction.
    pub block_number: Option<u64>,
    /// Whether the transaction executed successfully.
    pub status: bool,
}
