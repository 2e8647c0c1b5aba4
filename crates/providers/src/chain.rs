use crate::{ProviderError, Subscription};

use alloy_primitives::{Address, Bytes, B256};
use rollup_node_primitives::{BlockEvent, LogEvent, LogFilter, TransactionReceipt};

/// A transaction included in, or pending for, the base chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTransaction {
    /// The transaction hash.
    pub hash: B256,
    /// The recipient, [`None`] for contract creations.
    pub to: Option<Address>,
    /// The transaction input.
    pub input: Bytes,
    /// The number of the including block, if included.
    pub block_number: Option<u64>,
}

/// An instance of the trait can read data from the base chain.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait ChainReader: Send + Sync {
    /// Returns the number of the current head of the chain.
    async fn block_number(&self) -> Result<u64, ProviderError>;

    /// Returns the block with the provided number.
    async fn block_by_number(&self, number: u64) -> Result<Option<BlockEvent>, ProviderError>;

    /// Returns the block with the provided hash.
    async fn block_by_hash(&self, hash: B256) -> Result<Option<BlockEvent>, ProviderError>;

    /// Returns the logs matching the filter in the inclusive block range, ordered by block number
    /// and log index.
    async fn logs(
        &self,
        filter: &LogFilter,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEvent>, ProviderError>;

    /// Returns the transaction with the provided hash.
    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<ChainTransaction>, ProviderError>;

    /// Returns the receipt of the transaction with the provided hash, if it was included.
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError>;
}

/// An instance of the trait pushes the numbers of newly mined blocks.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait NewHeadsProvider: Send + Sync {
    /// Subscribes to new heads. Every new head number is delivered once, in ascending order.
    async fn subscribe_new_heads(&self) -> Result<Subscription<u64>, ProviderError>;
}

/// An instance of the trait submits transactions to the base chain.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait TransactionSubmitter: Send + Sync {
    /// Sends a transaction calling `to` with the calldata and returns its hash.
    async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<B256, ProviderError>;
}
