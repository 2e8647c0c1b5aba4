use crate::{
    ChainReader, ChainTransaction, NewHeadsProvider, ProviderError, Subscription,
    SubscriptionSink, TransactionSubmitter,
};

use std::{collections::HashMap, sync::Arc};

use alloy_primitives::{keccak256, Address, Bytes, LogData, B256};
use parking_lot::Mutex;
use rollup_node_primitives::{BlockEvent, LogEvent, LogFilter, TransactionReceipt};

/// The block time of the mock chain, in seconds.
const MOCK_BLOCK_TIME: u64 = 12;

/// An in-memory base chain. Transactions are staged and included in the next mined block, along
/// with their logs. Cloning the chain returns a handle to the same state.
#[derive(Debug, Clone)]
pub struct MockChain {
    state: Arc<Mutex<MockChainState>>,
}

#[derive(Debug)]
struct StagedTransaction {
    hash: B256,
    logs: Vec<(Address, LogData)>,
}

#[derive(Debug, Default)]
struct MockChainState {
    blocks: Vec<BlockEvent>,
    logs: Vec<LogEvent>,
    transactions: HashMap<B256, ChainTransaction>,
    receipts: HashMap<B256, TransactionReceipt>,
    pending: Vec<StagedTransaction>,
    sent: Vec<(Address, Bytes)>,
    heads_subscribers: Vec<SubscriptionSink<u64>>,
    nonce: u64,
    auto_mine: bool,
    receipt_status: Option<bool>,
    withhold_receipts: bool,
    failing_log_queries: usize,
    failing_receipt_queries: usize,
    send_failure: Option<String>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    /// Returns a chain holding the genesis block only.
    pub fn new() -> Self {
        let chain = Self { state: Arc::new(Mutex::new(MockChainState::default())) };
        chain.mine_block();
        chain
    }

    /// Returns a chain holding the genesis block and `count` additional empty blocks.
    pub fn with_blocks(count: u64) -> Self {
        let chain = Self::new();
        for _ in 0..count {
            chain.mine_block();
        }
        chain
    }

    /// Mines every transaction sent through [`TransactionSubmitter`] into its own block.
    pub fn with_auto_mine(self) -> Self {
        self.state.lock().auto_mine = true;
        self
    }

    /// Sets the status reported by receipts of subsequently mined transactions.
    pub fn set_receipt_status(&self, status: bool) {
        self.state.lock().receipt_status = Some(status);
    }

    /// Withholds receipts for mined transactions while set.
    pub fn set_withhold_receipts(&self, withhold: bool) {
        self.state.lock().withhold_receipts = withhold;
    }

    /// Fails the next `count` log queries.
    pub fn fail_next_log_queries(&self, count: usize) {
        self.state.lock().failing_log_queries = count;
    }

    /// Fails the next `count` receipt queries.
    pub fn fail_next_receipt_queries(&self, count: usize) {
        self.state.lock().failing_receipt_queries = count;
    }

    /// Fails every transaction submission with the message while set.
    pub fn set_send_failure(&self, message: Option<&str>) {
        self.state.lock().send_failure = message.map(ToOwned::to_owned);
    }

    /// Stages a transaction for inclusion in the next mined block and returns its hash.
    pub fn stage_transaction(&self, to: Address, input: Bytes, logs: Vec<LogData>) -> B256 {
        let mut state = self.state.lock();
        state.nonce += 1;
        let hash = keccak256(state.nonce.to_be_bytes());
        state.transactions.insert(
            hash,
            ChainTransaction { hash, to: Some(to), input, block_number: None },
        );
        let logs = logs.into_iter().map(|data| (to, data)).collect();
        state.pending.push(StagedTransaction { hash, logs });
        hash
    }

    /// Mines a block including every staged transaction and notifies the head subscribers.
    pub fn mine_block(&self) -> BlockEvent {
        let mut state = self.state.lock();
        let number = state.blocks.len() as u64;
        let parent_hash = state.blocks.last().map(|b| b.hash).unwrap_or_default();
        let block = BlockEvent {
            number,
            hash: keccak256(number.to_be_bytes()),
            parent_hash,
            timestamp: number * MOCK_BLOCK_TIME,
        };
        state.blocks.push(block);

        let status = state.receipt_status.unwrap_or(true);
        let mut log_index = 0;
        for tx in std::mem::take(&mut state.pending) {
            for (address, data) in tx.logs {
                state.logs.push(LogEvent {
                    address,
                    topics: data.topics().to_vec(),
                    data: data.data,
                    block_number: number,
                    block_hash: block.hash,
                    transaction_hash: tx.hash,
                    log_index,
                });
                log_index += 1;
            }
            if let Some(t) = state.transactions.get_mut(&tx.hash) {
                t.block_number = Some(number);
            }
            state.receipts.insert(
                tx.hash,
                TransactionReceipt { transaction_hash: tx.hash, block_number: Some(number), status },
            );
        }

        state.heads_subscribers.retain(|sink| sink.try_send(number));
        block
    }

    /// Returns the transactions sent through [`TransactionSubmitter`].
    pub fn sent_transactions(&self) -> Vec<(Address, Bytes)> {
        self.state.lock().sent.clone()
    }

    /// Returns the number of live head subscriptions.
    pub fn heads_subscriber_count(&self) -> usize {
        self.state.lock().heads_subscribers.iter().filter(|s| !s.is_closed()).count()
    }
}

#[async_trait::async_trait]
impl ChainReader for MockChain {
    async fn block_number(&self) -> Result<u64, ProviderError> {
        Ok(self.state.lock().blocks.len() as u64 - 1)
    }

    async fn block_by_number(&self, number: u64) -> Result<Option<BlockEvent>, ProviderError> {
        Ok(self.state.lock().blocks.get(number as usize).copied())
    }

    async fn block_by_hash(&self, hash: B256) -> Result<Option<BlockEvent>, ProviderError> {
        Ok(self.state.lock().blocks.iter().find(|b| b.hash == hash).copied())
    }

    async fn logs(
        &self,
        filter: &LogFilter,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEvent>, ProviderError> {
        let mut state = self.state.lock();
        if state.failing_log_queries > 0 {
            state.failing_log_queries -= 1;
            return Err(ProviderError::Other("log query failed".into()));
        }
        Ok(state
            .logs
            .iter()
            .filter(|log| (from_block..=to_block).contains(&log.block_number))
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<ChainTransaction>, ProviderError> {
        Ok(self.state.lock().transactions.get(&hash).cloned())
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let mut state = self.state.lock();
        if state.failing_receipt_queries > 0 {
            state.failing_receipt_queries -= 1;
            return Err(ProviderError::Other("connection reset".into()));
        }
        if state.withhold_receipts {
            return Ok(None);
        }
        Ok(state.receipts.get(&hash).cloned())
    }
}

#[async_trait::async_trait]
impl NewHeadsProvider for MockChain {
    async fn subscribe_new_heads(&self) -> Result<Subscription<u64>, ProviderError> {
        let (sink, subscription) = Subscription::channel();
        self.state.lock().heads_subscribers.push(sink);
        Ok(subscription)
    }
}

#[async_trait::async_trait]
impl TransactionSubmitter for MockChain {
    async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<B256, ProviderError> {
        let auto_mine = {
            let mut state = self.state.lock();
            if let Some(message) = &state.send_failure {
                return Err(ProviderError::Other(message.clone()));
            }
            state.sent.push((to, calldata.clone()));
            state.auto_mine
        };
        let hash = self.stage_transaction(to, calldata, vec![]);
        if auto_mine {
            self.mine_block();
        }
        Ok(hash)
    }
}
