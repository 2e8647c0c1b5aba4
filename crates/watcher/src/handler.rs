use crate::HandlerError;

use rollup_node_primitives::ChainEvent;

/// An application handler of chain events.
///
/// Events are handed over in ascending order, each exactly once. A handler must not return
/// before the event is durably handled: an error stops the watcher rather than skipping the event.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait EventHandler: Send + Sync {
    /// Handles the event.
    async fn handle(&self, event: &ChainEvent) -> Result<(), HandlerError>;

    /// Called once the catch-up sync of the subscription completed, or on subscription if it had
    /// already completed.
    async fn on_sync_completed(&self, _subscription_id: &str) {}
}
