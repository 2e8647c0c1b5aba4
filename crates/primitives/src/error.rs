/// Errors related to rollup node primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupNodePrimitiveError {
    /// The log is missing a block number.
    MissingBlockNumber,
    /// The log is missing a block hash.
    MissingBlockHash,
    /// The log is missing a transaction hash.
    MissingTransactionHash,
    /// The log is missing its index in the block.
    MissingLogIndex,
    /// The log was removed by a reorg.
    RemovedLog,
    /// An unknown batch submission status.
    UnknownBatchStatus,
}

impl core::fmt::Display for RollupNodePrimitiveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingBlockNumber => write!(f, "missing block number for log"),
            Self::MissingBlockHash => write!(f, "missing block hash for log"),
            Self::MissingTransactionHash => write!(f, "missing transaction hash for log"),
            Self::MissingLogIndex => write!(f, "missing log index for log"),
            Self::RemovedLog => write!(f, "log was removed from the canonical chain"),
            Self::UnknownBatchStatus => write!(f, "unknown batch submission status"),
        }
    }
}

impl std::error::Error for RollupNodePrimitiveError {}
