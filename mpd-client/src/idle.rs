//! Ownership and scheduling of the single server connection.
//!
//! One connection serves two masters: command exchanges issued from caller
//! threads, and the idle loop that keeps the server in `idle` so changes get
//! pushed. The monitor arbitrates. The session lives in a slot guarded by a
//! mutex; whoever takes it out has exclusive use of the socket until it goes
//! back. Caller threads queue on FIFO tickets, and the idle loop only
//! re-enters `idle` when no command is pending.
//!
//! Interrupting a blocked `idle` read cannot go through the slot (the idle
//! thread holds the session while it blocks), so the monitor keeps a spare
//! writer and injects `noidle` on it. At most one `noidle` is sent per idle
//! period; the server ignores a `noidle` that races with its own push, so
//! the injection is safe on both sides.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::listener::ListenerHub;
use crate::session::{ConnectionState, Session};
use crate::wire::Wire;

use mpd_protocol::Version;

/// Where the idle loop thread currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopState {
    /// Thread spawned, has not entered `idle` yet.
    Starting,
    /// Blocked in an `idle` read. A `noidle` injection can wake it.
    Idling,
    /// Yielded the session because commands are pending.
    Yielded,
    /// Exited, either gracefully or after a connection loss.
    Stopped,
}

pub(crate) struct MonitorState<W: Wire> {
    /// The session slot. `None` while a thread has the session checked out.
    pub session: Option<Session<W>>,
    /// Spare writer for `noidle` injection and for shutdown.
    pub writer: Option<W>,
    pub version: Option<Version>,
    pub connection: ConnectionState,
    pub loop_state: LoopState,
    /// Cleared on disconnect; the idle loop exits when it sees this drop.
    pub running: bool,
    /// One `noidle` per idle period. Reset each time `idle` is re-entered.
    pub cancel_sent: bool,
    /// Commands waiting for or holding the session.
    pub pending: usize,
    pub next_ticket: u64,
    pub now_serving: u64,
}

pub(crate) struct Monitor<W: Wire> {
    state: Mutex<MonitorState<W>>,
    cond: Condvar,
}

impl<W: Wire> Monitor<W> {
    pub fn new() -> Self {
        Monitor {
            state: Mutex::new(MonitorState {
                session: None,
                writer: None,
                version: None,
                connection: ConnectionState::Disconnected,
                loop_state: LoopState::Stopped,
                running: false,
                cancel_sent: false,
                pending: 0,
                next_ticket: 0,
                now_serving: 0,
            }),
            cond: Condvar::new(),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, MonitorState<W>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn notify_all(&self) {
        self.cond.notify_all();
    }

    pub fn wait<'a>(
        &self,
        guard: MutexGuard<'a, MonitorState<W>>,
    ) -> MutexGuard<'a, MonitorState<W>> {
        self.cond.wait(guard).unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Like [`wait`](Monitor::wait), returning whether the wait expired.
    pub fn wait_timeout<'a>(
        &self,
        guard: MutexGuard<'a, MonitorState<W>>,
        timeout: Duration,
    ) -> (MutexGuard<'a, MonitorState<W>>, bool) {
        let (guard, result) = self
            .cond
            .wait_timeout(guard, timeout)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (guard, result.timed_out())
    }

    /// Writes `noidle` on the spare writer if the idle loop is blocked in
    /// `idle` and no cancel went out this period. Call with the lock held
    /// so the check and the write are atomic against idle re-entry.
    pub fn cancel_idle(state: &mut MonitorState<W>) {
        if state.loop_state != LoopState::Idling || state.cancel_sent {
            return;
        }
        state.cancel_sent = true;
        if let Some(writer) = state.writer.as_mut() {
            tracing::trace!("interrupting idle");
            if let Err(err) = writer.write_all(b"noidle\n").and_then(|_| writer.flush()) {
                tracing::debug!(%err, "noidle injection failed");
            }
        }
    }

    /// Marks the connection dead and wakes every waiter. The caller decides
    /// whether listeners get notified.
    pub fn mark_dead(&self, state: &mut MonitorState<W>) {
        state.session = None;
        state.writer = None;
        state.version = None;
        state.running = false;
        state.connection = ConnectionState::Disconnected;
        self.notify_all();
    }
}

/// Body of the idle loop thread.
///
/// Takes the session whenever no command is pending, parks the server in
/// `idle`, and dispatches whatever `changed` lines come back. A read error
/// while idling means the connection is gone; the loop marks the monitor
/// dead, tells the connection listeners, and exits.
pub(crate) fn run<W: Wire>(monitor: Arc<Monitor<W>>, listeners: Arc<ListenerHub>) {
    tracing::debug!("idle loop started");
    loop {
        let mut session = {
            let mut state = monitor.lock();
            let mut session = loop {
                if !state.running {
                    state.loop_state = LoopState::Stopped;
                    monitor.notify_all();
                    tracing::debug!("idle loop stopped");
                    return;
                }
                if state.pending == 0 {
                    if let Some(session) = state.session.take() {
                        break session;
                    }
                }
                state.loop_state = LoopState::Yielded;
                state = monitor.wait(state);
            };

            // The `idle` write happens under the lock. A command thread that
            // locks after this sees Idling and may inject `noidle`; one can
            // never observe Idling before `idle` is actually on the wire.
            state.loop_state = LoopState::Idling;
            state.connection = ConnectionState::Idle;
            state.cancel_sent = false;
            if let Err(err) = session.enter_idle() {
                drop(state);
                stop_lost(&monitor, &listeners, &err.to_string());
                return;
            }
            session
        };

        match session.read_idle_changes() {
            Ok(changes) => {
                {
                    let mut state = monitor.lock();
                    state.session = Some(session);
                    state.loop_state = LoopState::Yielded;
                    state.connection = ConnectionState::Connected;
                    monitor.notify_all();
                }
                if !changes.is_empty() {
                    tracing::debug!(?changes, "server pushed changes");
                    listeners.notify_subsystems(changes);
                }
            }
            Err(err) => {
                stop_lost(&monitor, &listeners, &err.to_string());
                return;
            }
        }
    }
}

fn stop_lost<W: Wire>(monitor: &Monitor<W>, listeners: &ListenerHub, reason: &str) {
    let graceful = {
        let mut state = monitor.lock();
        let graceful = !state.running;
        state.loop_state = LoopState::Stopped;
        monitor.mark_dead(&mut state);
        graceful
    };
    if graceful {
        // disconnect() shut the socket under us on purpose.
        tracing::debug!("idle loop stopped");
    } else {
        tracing::warn!(reason, "connection lost while idling");
        listeners.notify_connection(ConnectionState::Disconnected);
    }
}
