use alloy_primitives::B256;
use rollup_node_primitives::EncodedBatch;

/// An event emitted by the indexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexerEvent {
    /// A sequencer batch appended to the canonical transaction chain has been decoded.
    SequencerBatch {
        /// The base chain block the batch was appended at.
        block_number: u64,
        /// The hash of the appending transaction.
        transaction_hash: B256,
        /// The decoded batch.
        batch: EncodedBatch,
    },
    /// The committed state roots of a batch have been indexed.
    StateBatchIndexed {
        /// The batch number.
        batch_number: u64,
        /// The base chain block the batch was appended at.
        block_number: u64,
        /// The number of committed roots.
        root_count: u64,
    },
}
