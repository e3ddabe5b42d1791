//! Subscription surface delivering fused-heading snapshots

use crate::types::HeadingSnapshot;

/// Handle identifying one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u32);

type Subscriber = Box<dyn FnMut(&HeadingSnapshot)>;

/// Delivers heading snapshots to presentation consumers
///
/// Delivery is synchronous and ordered: every processed input sample
/// produces exactly one notification to every subscriber, in
/// subscription order, before the sample-handling call returns. There is
/// no batching and no dropping; consumers that need decoupling bring
/// their own queue.
#[derive(Default)]
pub struct HeadingPublisher {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u32,
}

impl HeadingPublisher {
    /// Create an empty publisher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a snapshot consumer
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&HeadingSnapshot) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscription; returns whether it existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver one snapshot to every subscriber, in subscription order
    pub fn publish(&mut self, snapshot: &HeadingSnapshot) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(snapshot);
        }
    }
}
