use std::{fmt, sync::Arc};

use tokio::sync::watch;

/// The reason the scheduler shut down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A shutdown was requested through the [`crate::SchedulerHandle`].
    Requested,
    /// A task returned a fatal error.
    TaskFailed {
        /// The name of the task.
        task: &'static str,
        /// The error message.
        error: String,
    },
    /// A chain event watcher stopped delivering events.
    WatcherFailed(String),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("shutdown requested"),
            Self::TaskFailed { task, error } => write!(f, "task {task} failed: {error}"),
            Self::WatcherFailed(error) => write!(f, "watcher failed: {error}"),
        }
    }
}

/// A one-shot shutdown signal shared by every task of the scheduler. The first reason triggered
/// is kept.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Returns a new untriggered signal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Triggers the signal. Returns false if it was already triggered.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false
            }
            tracing::warn!(target: "rollup::manager", %reason, "shutdown triggered");
            *current = Some(reason);
            true
        })
    }

    /// Returns the reason of the shutdown, if triggered.
    pub fn reason(&self) -> Option<ShutdownReason> {
        self.tx.borrow().clone()
    }

    /// Waits for the signal to be triggered and returns its reason.
    pub async fn wait(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(reason) = rx.borrow_and_update().clone() {
                return reason
            }
            // The sender lives as long as `self`.
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_reason_wins() {
        let signal = ShutdownSignal::new();
        let waiter = tokio::spawn({
            let signal = signal.clone();
            async move { signal.wait().await }
        });

        assert!(signal.trigger(ShutdownReason::WatcherFailed("closed".into())));
        assert!(!signal.trigger(ShutdownReason::Requested));

        assert_eq!(waiter.await.unwrap(), ShutdownReason::WatcherFailed("closed".into()));
        assert_eq!(signal.reason(), Some(ShutdownReason::WatcherFailed("closed".into())));
        assert_eq!(signal.wait().await, ShutdownReason::WatcherFailed("closed".into()));
    }
}
