//! EventBus: fan-out of graph events to subscriber channels.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::types::{ChangeEvent, GraphEvent};
use crate::types::collections::FxHashMap;

#[derive(Default)]
struct BusState {
    next_subscriber: u64,
    next_sequence: u64,
    subscribers: FxHashMap<u64, Sender<GraphEvent>>,
}

/// Publishes events to every live subscription.
///
/// Each subscription owns an unbounded channel. Dropping the
/// [`Subscription`] unregisters it; dropping the bus disconnects every
/// subscriber.
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState::default())),
        }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut state = lock(&self.state);
        state.next_subscriber += 1;
        let id = state.next_subscriber;
        state.subscribers.insert(id, sender);
        Subscription {
            id,
            receiver,
            bus: Arc::downgrade(&self.state),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    /// Publish one event to all subscribers and return its sequence number.
    pub fn publish(&self, change: ChangeEvent, analysis_initialized: bool) -> u64 {
        let mut state = lock(&self.state);
        state.next_sequence += 1;
        let sequence = state.next_sequence;
        if state.subscribers.is_empty() {
            return sequence;
        }
        let event = GraphEvent {
            sequence,
            analysis_initialized,
            change,
        };
        // A send only fails once the receiver is gone, which `Drop` already handles.
        state
            .subscribers
            .retain(|_, sender| sender.send(event.clone()).is_ok());
        sequence
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned handle to one subscription. Unsubscribes on drop.
pub struct Subscription {
    id: u64,
    receiver: Receiver<GraphEvent>,
    bus: Weak<Mutex<BusState>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next pending event, if any.
    ///
    /// `Err(TryRecvError::Disconnected)` means the publishing graph is gone.
    pub fn try_next(&self) -> Result<GraphEvent, TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// True while the publishing bus is still alive.
    pub fn is_connected(&self) -> bool {
        self.bus.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.bus.upgrade() {
            lock(&state).subscribers.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pending", &self.receiver.len())
            .finish()
    }
}

fn lock(state: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
