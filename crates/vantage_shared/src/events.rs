//! # VANTAGE Event Registry
//!
//! Explicit listener registry for every observable field in the viewer.
//!
//! ## Rules
//!
//! ```text
//! ┌─────────────┐  raise(&T)  ┌─────────────┐  snapshot  ┌─────────────┐
//! │  Producer   │────────────>│  Registry   │───────────>│  Listeners  │
//! └─────────────┘             └─────────────┘  (no lock) └─────────────┘
//! ```
//!
//! - The registry lock is released before any listener runs, so a listener
//!   may add or remove listeners, or raise events, without deadlocking.
//! - Listeners added during a raise are first called on the next raise.
//! - Unsubscription is explicit: dropping a [`Subscription`] keeps the listener.

use std::sync::{Arc, Weak};

use crossbeam_channel::{bounded, Receiver, TrySendError};
use parking_lot::Mutex;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Type-erased removal, so subscriptions to different payload types can be
/// stored side by side.
trait Unsubscribe: Send + Sync {
    fn remove(&self, id: u64) -> bool;
}

impl<T: 'static> Unsubscribe for Mutex<Registry<T>> {
    fn remove(&self, id: u64) -> bool {
        let mut registry = self.lock();
        let before = registry.listeners.len();
        registry.listeners.retain(|(listener_id, _)| *listener_id != id);
        registry.listeners.len() != before
    }
}

/// Handle for removing a listener from the event it was added to.
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe() on teardown"]
pub struct Subscription {
    id: u64,
    registry: Weak<dyn Unsubscribe>,
}

impl Subscription {
    /// Removes the listener.
    ///
    /// Returns `false` when the listener was already removed or the event no
    /// longer exists.
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// A single observable event carrying a `T` payload.
///
/// Cloning an `Event` yields another handle to the same registry.
pub struct Event<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Event<T> {
    /// Creates an event with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Registers a listener.
    pub fn add_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription { id, registry: weak }
    }

    /// Forwards every payload into a bounded channel.
    ///
    /// Payloads raised while the channel is full are dropped, the producer
    /// never blocks.
    pub fn subscribe_channel(&self, capacity: usize) -> (Subscription, Receiver<T>)
    where
        T: Clone + Send,
    {
        let (sender, receiver) = bounded(capacity);
        let subscription = self.add_listener(move |payload: &T| {
            match sender.try_send(payload.clone()) {
                Ok(()) => {}
                // Consumer is behind or gone - drop the payload
                Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {}
            }
        });
        (subscription, receiver)
    }

    /// Invokes every listener with `payload`.
    ///
    /// Returns the number of listeners invoked.
    pub fn raise(&self, payload: &T) -> usize {
        let snapshot: Vec<Listener<T>> = self
            .registry
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &snapshot {
            listener(payload);
        }
        snapshot.len()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

impl<T: 'static> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> std::fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("listeners", &self.registry.lock().listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_raise_reaches_every_listener() {
        let event: Event<u32> = Event::new();
        let total = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let total = Arc::clone(&total);
            let _ = event.add_listener(move |value| {
                total.fetch_add(*value as usize, Ordering::SeqCst);
            });
        }

        assert_eq!(event.raise(&2), 3);
        assert_eq!(total.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_unsubscribe_removes_listener() {
        let event: Event<()> = Event::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let subscription = event.add_listener(move |()| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(event.listener_count(), 1);

        assert!(subscription.unsubscribe());
        assert_eq!(event.listener_count(), 0);

        event.raise(&());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_after_event_dropped() {
        let event: Event<()> = Event::new();
        let subscription = event.add_listener(|()| {});
        drop(event);
        assert!(!subscription.unsubscribe());
    }

    #[test]
    fn test_listener_can_reenter_registry() {
        let event: Event<u32> = Event::new();
        let inner = event.clone();
        let _ = event.add_listener(move |value| {
            if *value == 0 {
                // Registering from inside a raise must not deadlock
                let _ = inner.add_listener(|_| {});
                inner.raise(&1);
            }
        });

        assert_eq!(event.raise(&0), 1);
        assert_eq!(event.listener_count(), 2);
    }

    #[test]
    fn test_channel_subscription_drops_when_full() {
        let event: Event<u32> = Event::new();
        let (subscription, receiver) = event.subscribe_channel(2);

        for i in 0..5 {
            event.raise(&i);
        }

        let received: Vec<u32> = receiver.try_iter().collect();
        assert_eq!(received, vec![0, 1]);
        assert!(subscription.unsubscribe());
    }
}
