use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mpd_protocol::SubsystemSet;

use crate::session::ConnectionState;

/// Receives every batch of subsystem changes the server pushes.
///
/// Callbacks run on the idle loop thread while the hub lock is held, so they
/// must return quickly and must not call back into the client. Hand heavier
/// work to a channel, or use [`MpdClient::events`](crate::MpdClient::events)
/// which does exactly that.
pub trait SubsystemListener: Send {
    fn subsystems_changed(&self, changes: SubsystemSet);
}

impl<F: Fn(SubsystemSet) + Send> SubsystemListener for F {
    fn subsystems_changed(&self, changes: SubsystemSet) {
        self(changes)
    }
}

/// Receives connection lifecycle transitions. Same threading rules as
/// [`SubsystemListener`].
pub trait ConnectionListener: Send {
    fn connection_changed(&self, state: ConnectionState);
}

impl<F: Fn(ConnectionState) + Send> ConnectionListener for F {
    fn connection_changed(&self, state: ConnectionState) {
        self(state)
    }
}

/// Handle returned by registration, used to unregister later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub(crate) struct ListenerHub {
    next_id: AtomicU64,
    subsystem: Mutex<Vec<(ListenerId, Box<dyn SubsystemListener>)>>,
    connection: Mutex<Vec<(ListenerId, Box<dyn ConnectionListener>)>>,
}

impl ListenerHub {
    pub fn new() -> Self {
        ListenerHub {
            next_id: AtomicU64::new(1),
            subsystem: Mutex::new(Vec::new()),
            connection: Mutex::new(Vec::new()),
        }
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn add_subsystem(&self, listener: Box<dyn SubsystemListener>) -> ListenerId {
        let id = self.next_id();
        lock_recovering(&self.subsystem).push((id, listener));
        id
    }

    pub fn add_connection(&self, listener: Box<dyn ConnectionListener>) -> ListenerId {
        let id = self.next_id();
        lock_recovering(&self.connection).push((id, listener));
        id
    }

    /// Returns false when the id was already gone.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut subsystem = lock_recovering(&self.subsystem);
        let before = subsystem.len();
        subsystem.retain(|(slot, _)| *slot != id);
        if subsystem.len() != before {
            return true;
        }
        drop(subsystem);

        let mut connection = lock_recovering(&self.connection);
        let before = connection.len();
        connection.retain(|(slot, _)| *slot != id);
        connection.len() != before
    }

    pub fn notify_subsystems(&self, changes: SubsystemSet) {
        for (_, listener) in lock_recovering(&self.subsystem).iter() {
            listener.subsystems_changed(changes);
        }
    }

    pub fn notify_connection(&self, state: ConnectionState) {
        for (_, listener) in lock_recovering(&self.connection).iter() {
            listener.connection_changed(state);
        }
    }
}

fn lock_recovering<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Blocking iterator over pushed subsystem changes, backed by a channel fed
/// from the idle loop. Unregisters itself on drop.
pub struct SubsystemEvents {
    rx: Receiver<SubsystemSet>,
    id: ListenerId,
    hub: Arc<ListenerHub>,
}

impl SubsystemEvents {
    pub(crate) fn register(hub: Arc<ListenerHub>) -> Self {
        let (tx, rx) = mpsc::channel();
        let id = hub.add_subsystem(Box::new(ChannelListener(tx)));
        SubsystemEvents { rx, id, hub }
    }

    /// Next batch, or `None` once the client is gone.
    pub fn recv(&self) -> Option<SubsystemSet> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SubsystemSet> {
        match self.rx.recv_timeout(timeout) {
            Ok(changes) => Some(changes),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_recv(&self) -> Option<SubsystemSet> {
        self.rx.try_recv().ok()
    }
}

impl Iterator for SubsystemEvents {
    type Item = SubsystemSet;

    fn next(&mut self) -> Option<SubsystemSet> {
        self.recv()
    }
}

impl Drop for SubsystemEvents {
    fn drop(&mut self) {
        self.hub.remove(self.id);
    }
}

struct ChannelListener(Sender<SubsystemSet>);

impl SubsystemListener for ChannelListener {
    fn subsystems_changed(&self, changes: SubsystemSet) {
        // Receiver dropped before unregistration is not an error.
        let _ = self.0.send(changes);
    }
}
