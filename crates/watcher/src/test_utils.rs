use crate::{EventHandler, HandlerError};

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use rollup_node_primitives::ChainEvent;
use tokio::sync::Notify;

/// An [`EventHandler`] recording the events it receives.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<ChainEvent>>,
    synced: Mutex<Vec<String>>,
    fail_at_block: Mutex<Option<u64>>,
    notify: Notify,
}

impl RecordingHandler {
    /// Returns a new shared [`RecordingHandler`].
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fails the handling of any event of the block.
    pub fn fail_at_block(&self, block_number: u64) {
        *self.fail_at_block.lock() = Some(block_number);
    }

    /// Returns the events received so far.
    pub fn events(&self) -> Vec<ChainEvent> {
        self.events.lock().clone()
    }

    /// Returns the block numbers of the events received so far.
    pub fn block_numbers(&self) -> Vec<u64> {
        self.events.lock().iter().map(ChainEvent::block_number).collect()
    }

    /// Returns the subscriptions reported as synced.
    pub fn synced(&self) -> Vec<String> {
        self.synced.lock().clone()
    }

    /// Waits until `count` events were received.
    pub async fn wait_for_events(&self, count: usize) -> Vec<ChainEvent> {
        self.wait_until(|h| h.events.lock().len() >= count).await;
        self.events()
    }

    /// Waits until the subscription is reported as synced.
    pub async fn wait_for_sync(&self) {
        self.wait_until(|h| !h.synced.lock().is_empty()).await;
    }

    async fn wait_until(&self, condition: impl Fn(&Self) -> bool) {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                if condition(self) {
                    return
                }
                notified.await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .expect("condition not met before timeout");
    }
}

#[async_trait::async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: &ChainEvent) -> Result<(), HandlerError> {
        if *self.fail_at_block.lock() == Some(event.block_number()) {
            return Err(format!("failed to handle block {}", event.block_number()).into());
        }
        self.events.lock().push(event.clone());
        self.notify.notify_waiters();
        Ok(())
    }

    async fn on_sync_completed(&self, subscription_id: &str) {
        self.synced.lock().push(subscription_id.to_owned());
        self.notify.notify_waiters();
    }
}
