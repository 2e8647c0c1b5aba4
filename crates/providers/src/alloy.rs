use crate::{
    ChainReader, ChainTransaction, NewHeadsProvider, ProviderError, Subscription,
    TransactionSubmitter,
};

use std::{sync::Arc, time::Duration};

use alloy_eips::BlockNumberOrTag;
use alloy_network::{ReceiptResponse, TransactionResponse};
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{Block, Filter, TransactionRequest, TransactionTrait};
use rollup_node_primitives::{BlockEvent, LogEvent, LogFilter, TransactionReceipt};

/// The default interval at which the provider polls for new heads.
pub const DEFAULT_HEADS_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A base chain provider backed by an alloy [`Provider`].
#[derive(Debug)]
pub struct AlloyChainProvider<P> {
    provider: Arc<P>,
    heads_poll_interval: Duration,
}

impl<P> Clone for AlloyChainProvider<P> {
    fn clone(&self) -> Self {
        Self { provider: self.provider.clone(), heads_poll_interval: self.heads_poll_interval }
    }
}

impl<P: Provider + 'static> AlloyChainProvider<P> {
    /// Returns a new [`AlloyChainProvider`] wrapping the provider.
    pub fn new(provider: P) -> Self {
        Self { provider: Arc::new(provider), heads_poll_interval: DEFAULT_HEADS_POLL_INTERVAL }
    }

    /// Sets the interval at which new heads are polled.
    pub const fn with_heads_poll_interval(mut self, interval: Duration) -> Self {
        self.heads_poll_interval = interval;
        self
    }

    /// Returns a reference to the inner provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }
}

fn block_event(block: Block) -> BlockEvent {
    BlockEvent {
        number: block.header.number,
        hash: block.header.hash,
        parent_hash: block.header.parent_hash,
        timestamp: block.header.timestamp,
    }
}

#[async_trait::async_trait]
impl<P: Provider + 'static> ChainReader for AlloyChainProvider<P> {
    async fn block_number(&self) -> Result<u64, ProviderError> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn block_by_number(&self, number: u64) -> Result<Option<BlockEvent>, ProviderError> {
        let block = self.provider.get_block_by_number(BlockNumberOrTag::Number(number)).await?;
        Ok(block.map(block_event))
    }

    async fn block_by_hash(&self, hash: B256) -> Result<Option<BlockEvent>, ProviderError> {
        Ok(self.provider.get_block_by_hash(hash).await?.map(block_event))
    }

    async fn logs(
        &self,
        filter: &LogFilter,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEvent>, ProviderError> {
        let rpc_filter = Filter::new()
            .address(filter.address)
            .event_signature(filter.event_signature)
            .from_block(from_block)
            .to_block(to_block);
        tracing::trace!(target: "rollup::providers", %filter, from_block, to_block, "fetching logs");

        let mut logs = self
            .provider
            .get_logs(&rpc_filter)
            .await?
            .into_iter()
            .map(LogEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        logs.sort_by_key(LogEvent::position);
        Ok(logs)
    }

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<ChainTransaction>, ProviderError> {
        let Some(tx) = self.provider.get_transaction_by_hash(hash).await? else {
            return Ok(None);
        };
        Ok(Some(ChainTransaction {
            hash: TransactionResponse::tx_hash(&tx),
            to: TransactionTrait::to(&tx),
            input: TransactionTrait::input(&tx).clone(),
            block_number: tx.block_number,
        }))
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|r| TransactionReceipt {
            transaction_hash: r.transaction_hash(),
            block_number: r.block_number(),
            status: r.status(),
        }))
    }
}

#[async_trait::async_trait]
impl<P: Provider + 'static> NewHeadsProvider for AlloyChainProvider<P> {
    async fn subscribe_new_heads(&self) -> Result<Subscription<u64>, ProviderError> {
        let mut last = self.provider.get_block_number().await?;
        let (sink, subscription) = Subscription::channel();
        let provider = self.provider.clone();
        let poll_interval = self.heads_poll_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            loop {
                tokio::select! {
                    _ = sink.closed() => break,
                    _ = interval.tick() => {
                        let head = match provider.get_block_number().await {
                            Ok(head) => head,
                            Err(err) => {
                                tracing::warn!(target: "rollup::providers", ?err, "failed to poll head");
                                continue
                            }
                        };
                        for number in last + 1..=head {
                            if !sink.send(number).await {
                                return
                            }
                        }
                        last = last.max(head);
                    }
                }
            }
            tracing::debug!(target: "rollup::providers", "new heads subscription closed");
        });

        Ok(subscription)
    }
}

#[async_trait::async_trait]
impl<P: Provider + 'static> TransactionSubmitter for AlloyChainProvider<P> {
    async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<B256, ProviderError> {
        let request = TransactionRequest::default().to(to).input(calldata.into());
        let pending = self.provider.send_transaction(request).await?;
        let hash = *pending.tx_hash();
        tracing::debug!(target: "rollup::providers", %to, %hash, "sent transaction");
        Ok(hash)
    }
}
