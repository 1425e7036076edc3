use pneuma_types::SubscriptionId;
use tracing::debug;

use crate::snapshot::KernelSnapshot;

/// What a subscriber wants after handling a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Keep,
    Unsubscribe,
}

pub type SubscriberFn = Box<dyn FnMut(&KernelSnapshot) -> Delivery + Send>;

struct Subscriber {
    id: SubscriptionId,
    callback: SubscriberFn,
}

/// Registered observers of kernel state changes.
///
/// Callbacks run synchronously in registration order. A callback cannot
/// reach the set it lives in; removal requested during a notification pass
/// is deferred until the pass completes.
#[derive(Default)]
pub struct SubscriberSet {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: SubscriberFn) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber { id, callback });
        debug!(subscription_id = %id, "New subscription registered");
        id
    }

    /// Deliver to a single subscriber, used for the replay on subscribe.
    /// Returns false if that subscriber asked to leave.
    pub fn deliver_to(&mut self, id: SubscriptionId, snapshot: &KernelSnapshot) -> bool {
        let Some(index) = self.subscribers.iter().position(|s| s.id == id) else {
            return false;
        };
        if (self.subscribers[index].callback)(snapshot) == Delivery::Unsubscribe {
            self.subscribers.remove(index);
            debug!(subscription_id = %id, "Subscriber left during replay");
            return false;
        }
        true
    }

    /// Notify every subscriber. Returns the number notified.
    pub fn notify(&mut self, snapshot: &KernelSnapshot) -> usize {
        let mut leaving = Vec::new();
        for sub in self.subscribers.iter_mut() {
            if (sub.callback)(snapshot) == Delivery::Unsubscribe {
                leaving.push(sub.id);
            }
        }

        let delivered = self.subscribers.len();
        if !leaving.is_empty() {
            self.subscribers.retain(|s| !leaving.contains(&s.id));
            debug!(removed = leaving.len(), "Cleaned up departed subscribers");
        }
        delivered
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        let removed = self.subscribers.len() != before;
        if removed {
            debug!(subscription_id = %id, "Subscription removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberSet")
            .field("count", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
