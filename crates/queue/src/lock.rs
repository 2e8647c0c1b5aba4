use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A registry of async locks, one per key, created on first use. Holders of different keys never
/// contend.
///
/// Next to its lock, each key tracks the index handed to a handler that has not signalled
/// completion yet, so every queue built on the registry sees the same in-flight item.
#[derive(Debug, Default)]
pub struct KeyedLock {
    slots: Mutex<HashMap<String, Arc<KeySlot>>>,
}

/// The lock and in-flight index of one key.
#[derive(Debug, Default)]
pub(crate) struct KeySlot {
    lock: Arc<AsyncMutex<()>>,
    awaiting_completion: Mutex<Option<u64>>,
}

impl KeySlot {
    /// Waits for the lock of the key and returns its guard.
    pub(crate) async fn lock(&self) -> OwnedMutexGuard<()> {
        self.lock.clone().lock_owned().await
    }

    /// Returns the index awaiting completion, if any.
    pub(crate) fn awaiting_completion(&self) -> Option<u64> {
        *self.awaiting_completion.lock()
    }

    /// Records the index as handed to a handler.
    pub(crate) fn set_awaiting_completion(&self, index: u64) {
        *self.awaiting_completion.lock() = Some(index);
    }

    /// Clears the index awaiting completion if it is `index`.
    pub(crate) fn clear_awaiting_completion(&self, index: u64) {
        let mut awaiting = self.awaiting_completion.lock();
        if *awaiting == Some(index) {
            *awaiting = None;
        }
    }
}

impl KeyedLock {
    /// Returns a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the lock of the key and returns its guard. The lock is released when the guard
    /// is dropped.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        self.slot(key).lock().await
    }

    /// Returns the slot of the key, registering it on first use.
    pub(crate) fn slot(&self, key: &str) -> Arc<KeySlot> {
        self.slots.lock().entry(key.to_owned()).or_default().clone()
    }

    /// Returns the number of keys registered.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns true if no key is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_excludes() {
        let locks = Arc::new(KeyedLock::new());
        let guard = locks.lock("a").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("a").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let locks = KeyedLock::new();
        let _a = locks.lock("a").await;
        let _b = tokio::time::timeout(Duration::from_secs(1), locks.lock("b")).await.unwrap();
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn test_awaiting_completion_is_shared_per_key() {
        let locks = KeyedLock::new();
        locks.slot("a").set_awaiting_completion(3);

        assert_eq!(locks.slot("a").awaiting_completion(), Some(3));
        assert_eq!(locks.slot("b").awaiting_completion(), None);

        locks.slot("a").clear_awaiting_completion(2);
        assert_eq!(locks.slot("a").awaiting_completion(), Some(3));
        locks.slot("a").clear_awaiting_completion(3);
        assert_eq!(locks.slot("a").awaiting_completion(), None);
    }
}
