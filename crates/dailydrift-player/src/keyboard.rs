//! Process-wide keyboard fan-out with scoped subscriptions.
//!
//! A player attaches while it is mounted and receives every dispatched key.
//! The returned [`ListenerGuard`] detaches it on drop, so a torn-down player
//! never sees keys meant for its successor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use dailydrift_stories::domain::input::Key;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

type Listeners = Mutex<HashMap<u64, UnboundedSender<Key>>>;

/// Shared keyboard source.
#[derive(Debug, Clone, Default)]
pub struct KeyboardHub {
    listeners: Arc<Listeners>,
    next_id: Arc<AtomicU64>,
}

impl KeyboardHub {
    /// Creates a hub with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `sender` until the returned guard is dropped.
    #[must_use = "dropping the guard detaches the listener immediately"]
    pub fn attach(&self, sender: UnboundedSender<Key>) -> ListenerGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, sender);
        debug!(listener = id, "keyboard listener attached");
        ListenerGuard {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Delivers `key` to every attached listener and returns how many
    /// received it. Listeners whose receiver is gone are pruned.
    pub fn dispatch(&self, key: Key) -> usize {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|_, sender| sender.send(key).is_ok());
        listeners.len()
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Keeps a keyboard listener attached for as long as it lives.
#[derive(Debug)]
pub struct ListenerGuard {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
            debug!(listener = self.id, "keyboard listener detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_dispatch_reaches_every_attached_listener() {
        // Arrange
        let hub = KeyboardHub::new();
        let (first_tx, mut first_rx) = mpsc::unbounded_channel();
        let (second_tx, mut second_rx) = mpsc::unbounded_channel();
        let _first = hub.attach(first_tx);
        let _second = hub.attach(second_tx);

        // Act
        let delivered = hub.dispatch(Key::ArrowRight);

        // Assert
        assert_eq!(delivered, 2);
        assert_eq!(first_rx.try_recv().unwrap(), Key::ArrowRight);
        assert_eq!(second_rx.try_recv().unwrap(), Key::ArrowRight);
    }

    #[test]
    fn test_dropping_guard_detaches_listener() {
        let hub = KeyboardHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let guard = hub.attach(tx);
        assert_eq!(hub.listener_count(), 1);

        drop(guard);
        let delivered = hub.dispatch(Key::Space);

        assert_eq!(delivered, 0);
        assert_eq!(hub.listener_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dispatch_prunes_closed_receivers() {
        let hub = KeyboardHub::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let _guard = hub.attach(tx);
        drop(rx);

        let delivered = hub.dispatch(Key::ArrowLeft);

        assert_eq!(delivered, 0);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_guard_outliving_hub_drops_cleanly() {
        let hub = KeyboardHub::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let guard = hub.attach(tx);

        drop(hub);
        drop(guard);
    }
}
