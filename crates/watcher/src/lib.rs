//! Base chain event watcher for the rollup node.
//!
//! The watcher delivers blocks and filtered logs to subscribed [`EventHandler`]s, exactly once
//! and in block order. On subscription, a catch-up sync replays every final block from the
//! persisted cursor to the current head; newly mined blocks are then dispatched as soon as they
//! have enough confirmations.

mod config;
pub use config::{WatcherConfig, DEFAULT_LOG_QUERY_BLOCK_RANGE, DEFAULT_RETRY_BACKOFF};

mod cursor;
pub use cursor::CursorStore;

mod driver;
use driver::{Subscribers, TargetDriver, TargetState};

mod error;
pub use error::{HandlerError, WatcherError};

mod handler;
pub use handler::EventHandler;

mod metrics;
pub use metrics::WatcherMetrics;

mod target;
pub use target::WatchTarget;

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use rollup_node_providers::{ChainReader, NewHeadsProvider};
use tokio::{sync::mpsc, task::JoinHandle};

/// The receiver of the errors that stopped a watched target. Any error received here means
/// events of the target are no longer delivered.
pub type FatalErrors = mpsc::UnboundedReceiver<WatcherError>;

/// The chain event watcher. One driver task runs per watched target.
#[derive(Debug)]
pub struct ChainEventWatcher<P, C> {
    provider: Arc<P>,
    cursors: Arc<C>,
    config: WatcherConfig,
    targets: Mutex<HashMap<WatchTarget, (Arc<TargetState>, JoinHandle<()>)>>,
    fatal_tx: mpsc::UnboundedSender<WatcherError>,
    metrics: WatcherMetrics,
}

impl<P, C> ChainEventWatcher<P, C>
where
    P: ChainReader + NewHeadsProvider + 'static,
    C: CursorStore + 'static,
{
    /// Returns a new watcher and the receiver of its fatal errors.
    pub fn new(provider: P, cursors: C, config: WatcherConfig) -> (Self, FatalErrors) {
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            provider: Arc::new(provider),
            cursors: Arc::new(cursors),
            config,
            targets: Default::default(),
            fatal_tx,
            metrics: WatcherMetrics::default(),
        };
        (watcher, fatal_rx)
    }

    /// Subscribes the handler to the target.
    ///
    /// The first subscription to a target starts its delivery. With `sync_past_events`, delivery
    /// starts at the block after the persisted cursor, or at the configured earliest block,
    /// otherwise at the next final block. Later subscribers receive events from the current
    /// position on. A subscriber joining after the catch-up sync completed is notified through
    /// [`EventHandler::on_sync_completed`] immediately.
    pub async fn subscribe(
        &self,
        target: WatchTarget,
        handler: Arc<dyn EventHandler>,
        sync_past_events: bool,
    ) {
        let subscription_id = target.subscription_id();
        let already_synced = {
            let mut targets = self.targets.lock();
            match targets.get(&target) {
                Some((state, _)) => {
                    let mut subscribers = state.subscribers.lock();
                    subscribers.handlers.push(handler.clone());
                    subscribers.synced
                }
                None => {
                    let state = Arc::new(TargetState {
                        target,
                        subscription_id: subscription_id.clone(),
                        subscribers: Mutex::new(Subscribers {
                            handlers: vec![handler.clone()],
                            synced: false,
                        }),
                    });
                    let driver = TargetDriver {
                        provider: self.provider.clone(),
                        cursors: self.cursors.clone(),
                        state: state.clone(),
                        config: self.config,
                        metrics: self.metrics.clone(),
                        fatal_tx: self.fatal_tx.clone(),
                        sync_past_events,
                        next: 0,
                    };
                    tracing::info!(target: "rollup::watcher", %subscription_id, sync_past_events, "starting watcher");
                    targets.insert(target, (state, tokio::spawn(driver.run())));
                    false
                }
            }
        };

        if already_synced {
            handler.on_sync_completed(&subscription_id).await;
        }
    }

    /// Returns true if the catch-up sync of the target completed.
    pub fn is_synced(&self, target: &WatchTarget) -> bool {
        self.targets.lock().get(target).is_some_and(|(state, _)| state.subscribers.lock().synced)
    }

    /// Stops the delivery of every target and drops its new heads subscription.
    pub fn shutdown(&self) {
        for (target, (_, driver)) in self.targets.lock().drain() {
            tracing::info!(target: "rollup::watcher", %target, "stopping watcher");
            driver.abort();
        }
    }
}

impl<P, C> Drop for ChainEventWatcher<P, C> {
    fn drop(&mut self) {
        for (_, driver) in self.targets.get_mut().values() {
            driver.abort();
        }
    }
}
