/// View-state change notification.
///
/// The document owns a `ViewStateNotifier`; observers (the UI layer)
/// subscribe with a callback and are invoked synchronously after every
/// successful mutation, receiving the new state version. Lifecycle is
/// scoped to the document instance, no global state.
use std::collections::BTreeMap;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callback invoked with the document's new state version.
pub type ViewStateCallback = Box<dyn FnMut(u64)>;

/// Publishes view-state-changed events to subscribed observers.
#[derive(Default)]
pub struct ViewStateNotifier {
    /// Subscribers in subscription order (BTreeMap keeps ids sorted).
    subscribers: BTreeMap<u64, ViewStateCallback>,
    /// Next subscription id to hand out.
    next_id: u64,
}

impl std::fmt::Debug for ViewStateNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewStateNotifier")
            .field("subscriber_count", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl ViewStateNotifier {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback and returns its subscription handle.
    pub fn subscribe(&mut self, callback: ViewStateCallback) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, callback);
        SubscriptionId(id)
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id.0).is_some()
    }

    /// Invokes every subscriber with the new state version.
    pub fn notify(&mut self, version: u64) {
        for callback in self.subscribers.values_mut() {
            callback(version);
        }
    }

    /// Returns the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
