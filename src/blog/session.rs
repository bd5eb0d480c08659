//! Session change notifications.
//!
//! A [`SessionHub`] fans provider-originated changes out to every mounted
//! listener. Registering a listener returns a [`Subscription`] guard; dropping the
//! guard unregisters the listener and waits for any in-progress invocation, so
//! once the drop returns the listener never runs again.

use crate::blog::model::Session;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// A change in the held session, carrying the session that replaces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    pub session: Option<Session>,
}

impl SessionEvent {
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        Self {
            kind: SessionEventKind::SignedIn,
            session: Some(session),
        }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            kind: SessionEventKind::SignedOut,
            session: None,
        }
    }

    #[must_use]
    pub fn token_refreshed(session: Session) -> Self {
        Self {
            kind: SessionEventKind::TokenRefreshed,
            session: Some(session),
        }
    }
}

pub type SessionHandler = Box<dyn Fn(&SessionEvent) + Send + Sync>;

type Slot = Arc<Mutex<Option<SessionHandler>>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    slots: BTreeMap<u64, Slot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct SessionHub {
    listeners: Arc<Mutex<Listeners>>,
}

impl SessionHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for every future change.
    pub fn subscribe(&self, handler: SessionHandler) -> Subscription {
        let slot: Slot = Arc::new(Mutex::new(Some(handler)));
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.slots.insert(id, Arc::clone(&slot));

        Subscription {
            id,
            slot,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Delivers `event` to every registered listener in registration order.
    pub fn notify(&self, event: &SessionEvent) {
        // Snapshot first so listeners may subscribe without deadlocking the hub.
        let slots: Vec<Slot> = lock(&self.listeners).slots.values().cloned().collect();
        for slot in slots {
            if let Some(handler) = lock(&slot).as_ref() {
                handler(event);
            }
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).slots.len()
    }
}

/// Registration guard returned by [`SessionHub::subscribe`].
/// Must not be dropped from inside its own listener.
#[must_use = "dropping a subscription unregisters the listener"]
pub struct Subscription {
    id: u64,
    slot: Slot,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Unregisters the listener. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).slots.remove(&self.id);
        }
        lock(&self.slot).take();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
