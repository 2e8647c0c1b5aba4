use crate::{IndexerError, IndexerEvent, IndexerItem, IndexerMetrics};

use std::{collections::HashMap, time::Instant};

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolEvent;
use rollup_codec::BatchCodec;
use rollup_db::{Database, DatabaseOperations};
use rollup_l1::abi::{
    calls::AppendStateBatchCall,
    logs::{try_decode_log, SequencerBatchAppended, StateBatchAppended},
};
use rollup_node_primitives::{ChainEvent, LogEvent};
use rollup_node_providers::ChainReader;
use rollup_node_queue::QueueEntry;
use strum::IntoEnumIterator;
use tokio::sync::mpsc;

/// Handles the chain events persisted by the indexer, in queue order.
///
/// Logs with malformed data are logged and dropped. Provider and database failures are returned
/// so the queue retries the same event.
#[derive(Debug)]
pub struct L1LogHandler<R> {
    reader: R,
    database: Database,
    events: mpsc::UnboundedSender<IndexerEvent>,
    metrics: HashMap<IndexerItem, IndexerMetrics>,
}

impl<R: ChainReader> L1LogHandler<R> {
    /// Returns a new [`L1LogHandler`] emitting its events on the channel.
    pub fn new(
        reader: R,
        database: Database,
        events: mpsc::UnboundedSender<IndexerEvent>,
    ) -> Self {
        let metrics = IndexerItem::iter()
            .map(|i| (i, IndexerMetrics::new_with_labels(&[("item", i.as_str())])))
            .collect();
        Self { reader, database, events, metrics }
    }

    /// Handles the queue entry, then marks it processed.
    pub async fn handle_entry(&self, entry: QueueEntry<ChainEvent>) -> Result<(), IndexerError> {
        if let Some(event) = self.handle_event(&entry.payload).await? {
            self.events.send(event).map_err(|_| IndexerError::EventChannelClosed)?;
        }
        entry.completion.mark_processed().await?;
        Ok(())
    }

    /// Handles the chain event, returning the resulting [`IndexerEvent`] if any.
    pub async fn handle_event(
        &self,
        event: &ChainEvent,
    ) -> Result<Option<IndexerEvent>, IndexerError> {
        let ChainEvent::Log(log) = event else {
            self.record(IndexerItem::Ignored, Instant::now());
            return Ok(None)
        };

        let now = Instant::now();
        let signature = log.signature();
        let (item, result) = if signature == Some(SequencerBatchAppended::SIGNATURE_HASH) {
            (IndexerItem::SequencerBatch, self.handle_sequencer_batch(log).await)
        } else if signature == Some(StateBatchAppended::SIGNATURE_HASH) {
            (IndexerItem::StateBatch, self.handle_state_batch(log).await)
        } else {
            tracing::trace!(target: "rollup::indexer", ?signature, "ignoring log");
            (IndexerItem::Ignored, Ok(None))
        };
        self.record(item, now);
        result
    }

    async fn handle_sequencer_batch(
        &self,
        log: &LogEvent,
    ) -> Result<Option<IndexerEvent>, IndexerError> {
        let input = self.transaction_input(log).await?;
        match BatchCodec::decode_append_sequencer_batch(&input) {
            Ok(batch) => {
                tracing::debug!(target: "rollup::indexer", block_number = log.block_number, should_start_at_batch = batch.should_start_at_batch, "indexed sequencer batch");
                Ok(Some(IndexerEvent::SequencerBatch {
                    block_number: log.block_number,
                    transaction_hash: log.transaction_hash,
                    batch,
                }))
            }
            Err(err) => {
                self.malformed(log, &err);
                Ok(None)
            }
        }
    }

    async fn handle_state_batch(
        &self,
        log: &LogEvent,
    ) -> Result<Option<IndexerEvent>, IndexerError> {
        let Some(decoded) = try_decode_log::<StateBatchAppended>(&log.to_primitive_log()) else {
            self.malformed(log, &"invalid StateBatchAppended log data");
            return Ok(None)
        };
        let Ok(batch_number) = u64::try_from(decoded.data._batchIndex) else {
            self.malformed(log, &"batch index overflows u64");
            return Ok(None)
        };

        let input = self.transaction_input(log).await?;
        let Some(call) = AppendStateBatchCall::try_decode(&input) else {
            self.malformed(log, &"invalid appendStateBatch calldata");
            return Ok(None)
        };
        let roots = call.state_roots();
        if roots.is_empty() || decoded.data._batchSize != U256::from(roots.len()) {
            self.malformed(log, &"state root count does not match batch size");
            return Ok(None)
        }

        let root_count = roots.len() as u64;
        self.database.insert_committed_state_roots(batch_number, roots).await?;
        tracing::debug!(target: "rollup::indexer", batch_number, root_count, "indexed committed state roots");

        Ok(Some(IndexerEvent::StateBatchIndexed {
            batch_number,
            block_number: log.block_number,
            root_count,
        }))
    }

    async fn transaction_input(&self, log: &LogEvent) -> Result<Bytes, IndexerError> {
        let tx = self
            .reader
            .transaction_by_hash(log.transaction_hash)
            .await?
            .ok_or(IndexerError::MissingTransaction(log.transaction_hash))?;
        Ok(tx.input)
    }

    fn malformed(&self, log: &LogEvent, reason: &dyn std::fmt::Display) {
        if let Some(metrics) = self.metrics.get(&IndexerItem::from_signature(log)) {
            metrics.malformed.increment(1);
        }
        tracing::warn!(
            target: "rollup::indexer",
            block_number = log.block_number,
            log_index = log.log_index,
            transaction_hash = %log.transaction_hash,
            %reason,
            "dropping malformed log"
        );
    }

    fn record(&self, item: IndexerItem, start: Instant) {
        if let Some(metrics) = self.metrics.get(&item) {
            metrics.task_duration.record(start.elapsed().as_secs_f64());
        }
    }
}

impl IndexerItem {
    fn from_signature(log: &LogEvent) -> Self {
        match log.signature() {
            Some(s) if s == SequencerBatchAppended::SIGNATURE_HASH => Self::SequencerBatch,
            Some(s) if s == StateBatchAppended::SIGNATURE_HASH => Self::StateBatch,
            _ => Self::Ignored,
        }
    }
}
