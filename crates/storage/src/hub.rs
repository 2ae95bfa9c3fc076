//! In-process fan-out of session snapshots to subscribers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use quiz_core::model::{ParticipantRecord, SessionId};

use crate::repository::StorageError;

/// Receives the full set of participant records of a session.
pub type SnapshotListener = Arc<dyn Fn(Vec<ParticipantRecord>) + Send + Sync>;

/// Registry of snapshot listeners keyed by session.
///
/// Listeners are called synchronously and must not write back to the store
/// that delivered the snapshot.
#[derive(Default)]
pub struct SubscriberHub {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<SessionId, Vec<(u64, SnapshotListener)>>>,
}

impl SubscriberHub {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a listener for `session`. Delivery stops when the returned
    /// `Subscription` is cancelled or dropped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the registry lock is poisoned.
    pub fn register(
        self: &Arc<Self>,
        session: &SessionId,
        listener: SnapshotListener,
    ) -> Result<Subscription, StorageError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut guard = self
            .listeners
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.entry(session.clone()).or_default().push((id, listener));
        log::debug!("subscription {id} registered for session {session}");

        Ok(Subscription {
            hub: Arc::downgrade(self),
            session: session.clone(),
            id,
            active: true,
        })
    }

    /// Deliver `records` to every listener of `session`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the registry lock is poisoned.
    pub fn publish(
        &self,
        session: &SessionId,
        records: &[ParticipantRecord],
    ) -> Result<(), StorageError> {
        // Clone out so listeners run without the registry lock held.
        let listeners: Vec<SnapshotListener> = {
            let guard = self
                .listeners
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard
                .get(session)
                .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };

        for listener in listeners {
            listener(records.to_vec());
        }
        Ok(())
    }

    #[must_use]
    pub fn listener_count(&self, session: &SessionId) -> usize {
        self.listeners
            .lock()
            .map(|guard| guard.get(session).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Sessions with at least one live listener.
    #[must_use]
    pub fn sessions(&self) -> Vec<SessionId> {
        self.listeners
            .lock()
            .map(|guard| guard.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn remove(&self, session: &SessionId, id: u64) {
        let Ok(mut guard) = self.listeners.lock() else {
            return;
        };
        if let Some(entries) = guard.get_mut(session) {
            entries.retain(|(entry_id, _)| *entry_id != id);
            if entries.is_empty() {
                guard.remove(session);
            }
        }
        log::debug!("subscription {id} released for session {session}");
    }
}

/// Handle to a live snapshot subscription.
///
/// Dropping it stops delivery, same as `cancel`.
#[must_use = "dropping a Subscription stops delivery immediately"]
pub struct Subscription {
    hub: Weak<SubscriberHub>,
    session: SessionId,
    id: u64,
    active: bool,
}

impl Subscription {
    /// A handle attached to nothing. Useful for stores without live delivery.
    pub fn detached(session: SessionId) -> Self {
        Self {
            hub: Weak::new(),
            session,
            id: u64::MAX,
            active: false,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(&self.session, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("session", &self.session)
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
