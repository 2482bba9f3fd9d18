use std::fmt;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use mpd_protocol::{Command, ProtocolError, Version};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::idle::{self, LoopState, Monitor};
use crate::listener::{
    ConnectionListener, ListenerHub, ListenerId, SubsystemEvents, SubsystemListener,
};
use crate::session::{ConnectionState, Session};
use crate::wire::Wire;

type Dialer<W> = Box<dyn Fn() -> io::Result<W> + Send + Sync>;

/// Thread-safe facade over one MPD connection.
///
/// All command methods block the calling thread and are safe to call from
/// any number of threads; commands are serialized onto the connection in
/// call order. Between commands a background thread keeps the server parked
/// in `idle`, and pushed changes fan out to the registered listeners.
pub struct MpdClient<W: Wire = TcpStream> {
    monitor: Arc<Monitor<W>>,
    listeners: Arc<ListenerHub>,
    config: ClientConfig,
    dial: Option<Dialer<W>>,
    idle_thread: Mutex<Option<JoinHandle<()>>>,
    /// Serializes reconnect attempts so concurrent callers do not both dial.
    reconnect_gate: Mutex<()>,
}

impl MpdClient<TcpStream> {
    /// Dials the configured server, consumes the greeting, authenticates,
    /// and starts the idle loop.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let host = config.host.clone();
        let port = config.port;
        let timeout = config.connect_timeout;
        let dial: Dialer<TcpStream> = Box::new(move || {
            let addr = (host.as_str(), port)
                .to_socket_addrs()?
                .next()
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("no address found for {host}:{port}"),
                    )
                })?;
            TcpStream::connect_timeout(&addr, timeout)
        });

        let client = MpdClient {
            monitor: Arc::new(Monitor::new()),
            listeners: Arc::new(ListenerHub::new()),
            config,
            dial: Some(dial),
            idle_thread: Mutex::new(None),
            reconnect_gate: Mutex::new(()),
        };
        client.reconnect()?;
        Ok(client)
    }
}

impl<W: Wire> MpdClient<W> {
    /// Builds a client over an already-connected transport. Used by tests
    /// and by callers with their own dialing logic; auto-reconnect is
    /// unavailable because the client cannot dial again.
    pub fn over(wire: W, config: ClientConfig) -> Result<Self> {
        let client = MpdClient {
            monitor: Arc::new(Monitor::new()),
            listeners: Arc::new(ListenerHub::new()),
            config,
            dial: None,
            idle_thread: Mutex::new(None),
            reconnect_gate: Mutex::new(()),
        };
        client.establish(wire)?;
        Ok(client)
    }

    /// Current lifecycle state, as observed by connection listeners.
    pub fn state(&self) -> ConnectionState {
        self.monitor.lock().connection
    }

    /// Version the server announced in its greeting.
    pub fn protocol_version(&self) -> Option<Version> {
        self.monitor.lock().version
    }

    /// Sends `ping`. Cheap liveness probe.
    pub fn ping(&self) -> Result<()> {
        self.exchange(Command::new("ping")).map(|_| ())
    }

    pub fn add_subsystem_listener(&self, listener: Box<dyn SubsystemListener>) -> ListenerId {
        self.listeners.add_subsystem(listener)
    }

    pub fn add_connection_listener(&self, listener: Box<dyn ConnectionListener>) -> ListenerId {
        self.listeners.add_connection(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Channel-backed alternative to a listener: a blocking iterator of
    /// pushed subsystem changes. Drops unregister themselves.
    pub fn events(&self) -> SubsystemEvents {
        SubsystemEvents::register(Arc::clone(&self.listeners))
    }

    /// Tears the connection down and stops the idle loop. Idempotent.
    pub fn disconnect(&self) {
        {
            let mut state = self.monitor.lock();
            if state.running {
                state.running = false;
                Monitor::cancel_idle(&mut state);
                // Shutdown unblocks the idle thread if the noidle write was
                // not enough, e.g. a half-dead socket.
                if let Some(writer) = state.writer.as_ref() {
                    let _ = writer.shutdown();
                }
                self.monitor.notify_all();
            }
        }
        // The idle-thread mutex is never taken while the monitor is held:
        // the loop being joined needs the monitor to finish, and establish()
        // may be waiting on it for the same join.
        let handle = self
            .idle_thread
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }

        let was_connected = {
            let mut state = self.monitor.lock();
            let was_connected = state.connection != ConnectionState::Disconnected;
            self.monitor.mark_dead(&mut state);
            was_connected
        };
        if was_connected {
            tracing::debug!("disconnected");
            self.listeners.notify_connection(ConnectionState::Disconnected);
        }
    }

    /// Opens a session over `wire` and installs it into the monitor.
    fn establish(&self, wire: W) -> Result<()> {
        // Join a previous idle thread before touching monitor state. The
        // guard is dropped before the join; the exiting loop needs the
        // monitor, and holding any lock across the join invites a cycle.
        let previous = {
            let mut slot = self
                .idle_thread
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            slot.take()
        };
        if let Some(handle) = previous {
            let _ = handle.join();
        }

        self.set_connection_state(ConnectionState::Connecting);

        let session = Session::open(
            wire,
            self.config.password.as_deref(),
            self.config.connect_timeout,
            self.config.command_timeout,
        )
        .map_err(|err| {
            self.set_connection_state(ConnectionState::Disconnected);
            match err {
                ClientError::ConnectionLost(reason) | ClientError::Connect(reason) => {
                    ClientError::Connect(reason)
                }
                // Anything fatal to the attempt itself, a rejected password
                // excepted, reads as a failure to connect.
                ClientError::Protocol(err @ ProtocolError::BadGreeting(_)) => {
                    ClientError::Connect(err.to_string())
                }
                other => other,
            }
        })?;

        let writer = session
            .writer_clone()
            .map_err(|err| ClientError::Connect(err.to_string()))?;
        let version = session.version();

        {
            let mut state = self.monitor.lock();
            state.session = Some(session);
            state.writer = Some(writer);
            state.version = Some(version);
            state.running = true;
            state.loop_state = LoopState::Starting;
            state.connection = ConnectionState::Connected;
            state.cancel_sent = false;
            // Waiters queued against the dead connection hold tickets below
            // this and bail out when they wake; pending drains with them.
            state.now_serving = state.next_ticket;
            self.monitor.notify_all();
        }

        let monitor = Arc::clone(&self.monitor);
        let listeners = Arc::clone(&self.listeners);
        let handle = thread::Builder::new()
            .name("mpd-idle".into())
            .spawn(move || idle::run(monitor, listeners))
            .map_err(|err| ClientError::Connect(err.to_string()))?;
        *self
            .idle_thread
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);

        self.listeners.notify_connection(ConnectionState::Connected);
        Ok(())
    }

    /// Dials and establishes. Requires a dialer, so only clients built via
    /// [`connect`](MpdClient::connect) can do this.
    fn reconnect(&self) -> Result<()> {
        let dial = self.dial.as_ref().ok_or(ClientError::Disconnected)?;
        let wire = dial().map_err(|err| {
            self.set_connection_state(ConnectionState::Disconnected);
            ClientError::Connect(err.to_string())
        })?;
        self.establish(wire)
    }

    fn set_connection_state(&self, connection: ConnectionState) {
        self.monitor.lock().connection = connection;
        self.listeners.notify_connection(connection);
    }

    pub(crate) fn exchange(&self, command: Command) -> Result<Vec<(String, String)>> {
        self.with_session(|session| session.exchange(&command))
    }

    pub(crate) fn exchange_binary(
        &self,
        command: Command,
        sink: &mut Vec<u8>,
    ) -> Result<Vec<(String, String)>> {
        self.with_session(|session| session.exchange_binary(&command, sink))
    }

    /// Checks the session out of the monitor in FIFO order, runs `work`
    /// against it, and puts it back. Wakes the idle loop when pending
    /// commands hit zero.
    fn with_session<T>(&self, work: impl FnOnce(&mut Session<W>) -> Result<T>) -> Result<T> {
        if self.dead() {
            if self.config.auto_reconnect && self.dial.is_some() {
                let _gate = self
                    .reconnect_gate
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if self.dead() {
                    tracing::debug!("reconnecting");
                    self.reconnect()?;
                }
            } else {
                return Err(ClientError::Disconnected);
            }
        }

        let mut session = {
            let mut state = self.monitor.lock();
            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.pending += 1;
            Monitor::cancel_idle(&mut state);

            loop {
                if !state.running {
                    state.pending -= 1;
                    if state.now_serving == ticket {
                        state.now_serving += 1;
                        self.monitor.notify_all();
                    }
                    return Err(ClientError::Disconnected);
                }
                if ticket < state.now_serving {
                    // Reconnected while this waiter slept; its queue is gone.
                    state.pending -= 1;
                    return Err(ClientError::Disconnected);
                }
                if state.now_serving == ticket {
                    if let Some(session) = state.session.take() {
                        state.connection = ConnectionState::CommandActive;
                        break session;
                    }
                }
                // While the loop is parked in idle a cancel is already out
                // (pending commands keep it from re-parking), so a healthy
                // server yields the session promptly. Bound the wait; an
                // unanswered noidle means the connection is gone.
                if state.loop_state == LoopState::Idling {
                    let (guard, expired) =
                        self.monitor.wait_timeout(state, self.config.command_timeout);
                    state = guard;
                    if expired && state.running && state.loop_state == LoopState::Idling {
                        tracing::warn!("server did not leave idle, dropping the connection");
                        if let Some(writer) = state.writer.as_ref() {
                            let _ = writer.shutdown();
                        }
                        state.pending -= 1;
                        self.monitor.mark_dead(&mut state);
                        drop(state);
                        self.listeners.notify_connection(ConnectionState::Disconnected);
                        return Err(ClientError::ConnectionLost(
                            "timed out waiting for the server to leave idle".into(),
                        ));
                    }
                } else {
                    state = self.monitor.wait(state);
                }
            }
        };

        let result = work(&mut session);

        let lost = matches!(result, Err(ClientError::ConnectionLost(_)));
        {
            let mut state = self.monitor.lock();
            state.pending -= 1;
            state.now_serving += 1;
            if lost {
                self.monitor.mark_dead(&mut state);
            } else {
                state.session = Some(session);
                state.connection = ConnectionState::Connected;
            }
            self.monitor.notify_all();
        }
        if lost {
            tracing::warn!("connection lost during command exchange");
            self.listeners.notify_connection(ConnectionState::Disconnected);
        }
        result
    }

    fn dead(&self) -> bool {
        let state = self.monitor.lock();
        !state.running
    }
}

impl<W: Wire> fmt::Debug for MpdClient<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpdClient")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<W: Wire> Drop for MpdClient<W> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
