use tokio::sync::mpsc;

/// The buffer size of a subscription channel.
const SUBSCRIPTION_CHANNEL_SIZE: usize = 256;

/// A handle to a subscription. Dropping the handle or calling [`Subscription::unsubscribe`]
/// cancels the subscription, which the producer observes through [`SubscriptionSink::closed`].
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> Subscription<T> {
    /// Returns a connected sink and subscription pair.
    pub fn channel() -> (SubscriptionSink<T>, Self) {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CHANNEL_SIZE);
        (SubscriptionSink { tx }, Self { rx })
    }

    /// Receives the next item. Returns [`None`] once the producer is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Cancels the subscription.
    pub fn unsubscribe(mut self) {
        self.rx.close();
    }
}

/// The producing side of a [`Subscription`].
#[derive(Debug, Clone)]
pub struct SubscriptionSink<T> {
    tx: mpsc::Sender<T>,
}

impl<T> SubscriptionSink<T> {
    /// Sends the item to the subscriber. Returns false if the subscription was cancelled.
    pub async fn send(&self, item: T) -> bool {
        self.tx.send(item).await.is_ok()
    }

    /// Sends the item without waiting for buffer space. Returns false if the subscription was
    /// cancelled or its buffer is full.
    pub fn try_send(&self, item: T) -> bool {
        self.tx.try_send(item).is_ok()
    }

    /// Completes once the subscription is cancelled.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    /// Returns true if the subscription was cancelled.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
