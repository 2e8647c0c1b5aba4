use crate::{CursorStore, EventHandler, WatchTarget, WatcherConfig, WatcherError, WatcherMetrics};

use std::{fmt::Display, future::Future, sync::Arc};

use parking_lot::Mutex;
use rollup_node_primitives::{ChainEvent, Cursor, LogEvent, LogFilter};
use rollup_node_providers::{ChainReader, NewHeadsProvider};
use tokio::sync::mpsc;

/// The handlers subscribed to a target.
#[derive(Default)]
pub(crate) struct Subscribers {
    pub(crate) handlers: Vec<Arc<dyn EventHandler>>,
    pub(crate) synced: bool,
}

impl core::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscribers")
            .field("handlers", &self.handlers.len())
            .field("synced", &self.synced)
            .finish()
    }
}

/// The shared state of a watched target.
#[derive(Debug)]
pub(crate) struct TargetState {
    pub(crate) target: WatchTarget,
    pub(crate) subscription_id: String,
    pub(crate) subscribers: Mutex<Subscribers>,
}

/// Drives the delivery of one target: catch-up from the persisted cursor, then live heads.
///
/// Catch-up and live delivery run in this single task, so they never race and every block is
/// dispatched once.
#[derive(Debug)]
pub(crate) struct TargetDriver<P, C> {
    pub(crate) provider: Arc<P>,
    pub(crate) cursors: Arc<C>,
    pub(crate) state: Arc<TargetState>,
    pub(crate) config: WatcherConfig,
    pub(crate) metrics: WatcherMetrics,
    pub(crate) fatal_tx: mpsc::UnboundedSender<WatcherError>,
    pub(crate) sync_past_events: bool,
    /// The next block to dispatch.
    pub(crate) next: u64,
}

impl<P, C> TargetDriver<P, C>
where
    P: ChainReader + NewHeadsProvider + 'static,
    C: CursorStore + 'static,
{
    /// Runs the driver until a fatal error, which is forwarded to the fatal error channel.
    pub(crate) async fn run(mut self) {
        if let Err(err) = self.drive().await {
            self.metrics.fatal_errors.increment(1);
            tracing::error!(target: "rollup::watcher", subscription_id = %self.state.subscription_id, %err, "watcher stopped");
            let _ = self.fatal_tx.send(err);
        }
    }

    async fn drive(&mut self) -> Result<(), WatcherError> {
        let provider = self.provider.clone();

        // subscribe before reading the head so no block mined during catch-up is missed.
        let mut heads = self
            .with_retry("subscribe to new heads", || async {
                Ok::<_, WatcherError>(provider.subscribe_new_heads().await?)
            })
            .await;
        let head =
            self.with_retry("fetch head", || async { Ok::<_, WatcherError>(provider.block_number().await?) }).await;
        self.next = self.start_block(head).await;

        if let Some(final_block) = self.config.final_block(head) {
            self.dispatch_range(final_block).await?;
        }
        self.complete_sync().await;

        while let Some(head) = heads.recv().await {
            match self.config.final_block(head) {
                Some(final_block) if final_block >= self.next => {
                    self.dispatch_range(final_block).await?
                }
                _ => tracing::trace!(target: "rollup::watcher", subscription_id = %self.state.subscription_id, head, "no new final block"),
            }
        }

        Err(WatcherError::SubscriptionClosed(self.state.subscription_id.clone()))
    }

    /// Returns the first block to dispatch: the block after the persisted cursor, or the
    /// configured earliest block. Without historical sync, delivery starts after the current
    /// final block.
    async fn start_block(&self, head: u64) -> u64 {
        let id = &self.state.subscription_id;
        let cursors = self.cursors.clone();
        let cursor = self.with_retry("read cursor", || cursors.get_cursor(id)).await;

        match cursor {
            Some(cursor) => cursor + 1,
            None if self.sync_past_events => self.config.earliest_block,
            None => self.config.final_block(head).map_or(0, |b| b + 1).max(self.config.earliest_block),
        }
    }

    #[tracing::instrument(skip_all, fields(subscription_id = %self.state.subscription_id, from = self.next, to = to))]
    async fn dispatch_range(&mut self, to: u64) -> Result<(), WatcherError> {
        match self.state.target {
            WatchTarget::Blocks => self.dispatch_blocks(to).await,
            WatchTarget::Logs(filter) => self.dispatch_logs(filter, to).await,
        }
    }

    async fn dispatch_blocks(&mut self, to: u64) -> Result<(), WatcherError> {
        let provider = self.provider.clone();
        while self.next <= to {
            let number = self.next;
            let block = self
                .with_retry("fetch block", || async {
                    provider.block_by_number(number).await?.ok_or(WatcherError::MissingBlock(number))
                })
                .await;

            self.dispatch(ChainEvent::Block(block)).await?;
            self.metrics.blocks_dispatched.increment(1);
            self.persist_cursor(number).await;
            self.next = number + 1;
        }
        Ok(())
    }

    async fn dispatch_logs(&mut self, filter: LogFilter, to: u64) -> Result<(), WatcherError> {
        let provider = self.provider.clone();
        let range = self.config.log_query_block_range.max(1);
        while self.next <= to {
            let from = self.next;
            let end = to.min(from.saturating_add(range - 1));
            let logs = self
                .with_retry("fetch logs", || async {
                    Ok::<_, WatcherError>(provider.logs(&filter, from, end).await?)
                })
                .await;
            tracing::trace!(target: "rollup::watcher", subscription_id = %self.state.subscription_id, from, end, count = logs.len(), "fetched logs");

            let mut previous: Option<&LogEvent> = None;
            for log in &logs {
                if log.block_number < from ||
                    log.block_number > end ||
                    previous.is_some_and(|p| p.position() >= log.position())
                {
                    let err = WatcherError::OutOfOrder {
                        subscription_id: self.state.subscription_id.clone(),
                        previous: previous.map_or((from, 0), LogEvent::position),
                        next: log.position(),
                    };
                    return Err(err);
                }
                // the previous block is complete once a log of a later block shows up.
                if let Some(p) = previous.filter(|p| p.block_number < log.block_number) {
                    self.persist_cursor(p.block_number).await;
                }

                self.dispatch(ChainEvent::Log(log.clone())).await?;
                self.metrics.logs_dispatched.increment(1);
                previous = Some(log);
            }

            self.persist_cursor(end).await;
            self.next = end + 1;
        }
        Ok(())
    }

    /// Dispatches the event to every current subscriber, in subscription order.
    async fn dispatch(&self, event: ChainEvent) -> Result<(), WatcherError> {
        let handlers = self.state.subscribers.lock().handlers.clone();
        for handler in handlers {
            handler.handle(&event).await.map_err(|source| WatcherError::Handler {
                subscription_id: self.state.subscription_id.clone(),
                block_number: event.block_number(),
                source,
            })?;
        }
        Ok(())
    }

    async fn persist_cursor(&self, block_number: u64) {
        let cursor =
            Cursor { subscription_id: self.state.subscription_id.clone(), last_processed: block_number };
        let cursors = self.cursors.clone();
        self.with_retry("persist cursor", || cursors.set_cursor(cursor.clone())).await
    }

    async fn complete_sync(&self) {
        let handlers = {
            let mut subscribers = self.state.subscribers.lock();
            subscribers.synced = true;
            subscribers.handlers.clone()
        };
        tracing::info!(target: "rollup::watcher", subscription_id = %self.state.subscription_id, next = self.next, "sync completed");
        for handler in handlers {
            handler.on_sync_completed(&self.state.subscription_id).await;
        }
    }

    /// Retries the operation with a fixed backoff until it succeeds.
    async fn with_retry<T, E, F, Fut>(&self, operation: &'static str, f: F) -> T
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        loop {
            match f().await {
                Ok(value) => return value,
                Err(err) => {
                    self.metrics.fetch_retries.increment(1);
                    tracing::warn!(target: "rollup::watcher", subscription_id = %self.state.subscription_id, operation, %err, "retrying");
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
            }
        }
    }
}
