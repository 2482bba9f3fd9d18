//! In-memory server double for integration tests.
//!
//! [`MockWire`] implements [`Wire`] over shared buffers, and [`MockServer`]
//! scripts the far side: canned responses per command line, idle parking
//! with pushed changes, stalled commands for watchdog tests, and a
//! violation counter that trips when a command line arrives at a moment a
//! real server would misparse the stream.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use mpd_client::Wire;

const GREETING: &str = "OK MPD 0.24.0\n";

struct ServerState {
    /// Bytes queued for the client to read.
    inbox: VecDeque<u8>,
    /// Every line the client wrote, in arrival order.
    transcript: Vec<String>,
    /// Canned responses keyed by the exact command line.
    scripts: HashMap<String, VecDeque<Vec<u8>>>,
    /// Commands that get no response at all.
    stalled: HashSet<String>,
    /// Changes waiting for the next idle period.
    pending_changes: Vec<String>,
    idle_parked: bool,
    closed: bool,
    violations: usize,
    read_timeout: Option<Duration>,
    /// Written bytes not yet terminated by a newline.
    partial: Vec<u8>,
}

struct Inner {
    state: Mutex<ServerState>,
    cond: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap()
    }

    fn respond(&self, state: &mut ServerState, bytes: &[u8]) {
        state.inbox.extend(bytes.iter().copied());
        self.cond.notify_all();
    }

    fn handle_line(&self, state: &mut ServerState, line: String) {
        let exempt = line == "idle" || line == "noidle";
        if !exempt && (state.idle_parked || !state.inbox.is_empty()) {
            // A real server would be in idle mode, or still has an
            // unconsumed response in flight. Either way this command line
            // lands mid-stream.
            state.violations += 1;
        }
        state.transcript.push(line.clone());

        if line == "idle" {
            if state.pending_changes.is_empty() {
                state.idle_parked = true;
                self.cond.notify_all();
            } else {
                let body = drain_changes(state);
                self.respond(state, body.as_bytes());
            }
            return;
        }
        if line == "noidle" {
            // A stalled noidle models a partitioned server: the client
            // stays parked and nothing ever comes back.
            if state.stalled.contains(&line) {
                return;
            }
            // Ignored when not idling, exactly like the real daemon: the
            // client already has the full idle response in flight.
            if state.idle_parked {
                state.idle_parked = false;
                let body = drain_changes(state);
                self.respond(state, body.as_bytes());
            }
            return;
        }

        if state.stalled.contains(&line) {
            return;
        }
        let response = state
            .scripts
            .get_mut(&line)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| b"OK\n".to_vec());
        self.respond(state, &response);
    }
}

fn drain_changes(state: &mut ServerState) -> String {
    let mut body = String::new();
    for name in state.pending_changes.drain(..) {
        body.push_str("changed: ");
        body.push_str(&name);
        body.push('\n');
    }
    body.push_str("OK\n");
    body
}

/// Client-side handle, handed to `MpdClient::over`.
pub struct MockWire {
    inner: Arc<Inner>,
}

/// Test-side handle for scripting and inspection.
pub struct MockServer {
    inner: Arc<Inner>,
}

pub fn mock_connection() -> (MockServer, MockWire) {
    mock_connection_with_greeting(GREETING)
}

pub fn mock_connection_with_greeting(greeting: &str) -> (MockServer, MockWire) {
    let inner = Arc::new(Inner {
        state: Mutex::new(ServerState {
            inbox: greeting.bytes().collect(),
            transcript: Vec::new(),
            scripts: HashMap::new(),
            stalled: HashSet::new(),
            pending_changes: Vec::new(),
            idle_parked: false,
            closed: false,
            violations: 0,
            read_timeout: None,
            partial: Vec::new(),
        }),
        cond: Condvar::new(),
    });
    (
        MockServer {
            inner: Arc::clone(&inner),
        },
        MockWire { inner },
    )
}

impl MockServer {
    /// Queue a response for one occurrence of `command`: the given body
    /// lines followed by `OK`.
    pub fn respond(&self, command: &str, body: &[&str]) {
        let mut bytes = Vec::new();
        for line in body {
            bytes.extend_from_slice(line.as_bytes());
            bytes.push(b'\n');
        }
        bytes.extend_from_slice(b"OK\n");
        self.respond_raw(command, bytes);
    }

    /// Queue an `ACK` error response for one occurrence of `command`.
    pub fn respond_err(&self, command: &str, ack_line: &str) {
        self.respond_raw(command, format!("{ack_line}\n").into_bytes());
    }

    /// Queue a binary chunk response: a `size` field, the `binary` marker,
    /// the raw bytes, and the terminator.
    pub fn respond_binary(&self, command: &str, total: usize, chunk: &[u8]) {
        let mut bytes = format!("size: {total}\nbinary: {}\n", chunk.len()).into_bytes();
        bytes.extend_from_slice(chunk);
        bytes.push(b'\n');
        bytes.extend_from_slice(b"OK\n");
        self.respond_raw(command, bytes);
    }

    pub fn respond_raw(&self, command: &str, bytes: Vec<u8>) {
        self.inner
            .lock()
            .scripts
            .entry(command.to_string())
            .or_default()
            .push_back(bytes);
    }

    /// Swallow `command` without answering, so the watchdog fires.
    pub fn stall(&self, command: &str) {
        self.inner.lock().stalled.insert(command.to_string());
    }

    /// Deliver changed subsystems: immediately if the client is parked in
    /// idle, otherwise at the start of the next idle period.
    pub fn push_changes(&self, names: &[&str]) {
        let mut state = self.inner.lock();
        state
            .pending_changes
            .extend(names.iter().map(|n| n.to_string()));
        if state.idle_parked {
            state.idle_parked = false;
            let body = drain_changes(&mut state);
            self.inner.respond(&mut state, body.as_bytes());
        }
    }

    /// Block until the client parks in `idle`. Returns false on timeout.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.lock();
        while !state.idle_parked {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            let (guard, _) = self.inner.cond.wait_timeout(state, remaining).unwrap();
            state = guard;
        }
        true
    }

    /// Close the connection from the server side; reads start returning EOF.
    pub fn close(&self) {
        let mut state = self.inner.lock();
        state.closed = true;
        state.idle_parked = false;
        self.inner.cond.notify_all();
    }

    /// Every line the client wrote.
    pub fn transcript(&self) -> Vec<String> {
        self.inner.lock().transcript.clone()
    }

    /// The transcript without idle-loop plumbing.
    pub fn commands(&self) -> Vec<String> {
        self.transcript()
            .into_iter()
            .filter(|line| line != "idle" && line != "noidle")
            .collect()
    }

    pub fn violations(&self) -> usize {
        self.inner.lock().violations
    }
}

impl Read for MockWire {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut state = self.inner.lock();
        let timeout = state.read_timeout;
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if !state.inbox.is_empty() {
                let n = buf.len().min(state.inbox.len());
                for slot in buf.iter_mut().take(n) {
                    *slot = state.inbox.pop_front().unwrap();
                }
                return Ok(n);
            }
            if state.closed {
                return Ok(0);
            }
            state = match deadline {
                Some(deadline) => {
                    let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                        return Err(io::Error::new(io::ErrorKind::WouldBlock, "read timed out"));
                    };
                    self.inner.cond.wait_timeout(state, remaining).unwrap().0
                }
                None => self.inner.cond.wait(state).unwrap(),
            };
        }
    }
}

impl Write for MockWire {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.inner.lock();
        if state.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        }
        for &byte in buf {
            if byte == b'\n' {
                let raw = std::mem::take(&mut state.partial);
                let line = String::from_utf8_lossy(&raw).into_owned();
                self.inner.handle_line(&mut state, line);
            } else {
                state.partial.push(byte);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Wire for MockWire {
    fn try_clone(&self) -> io::Result<Self> {
        Ok(MockWire {
            inner: Arc::clone(&self.inner),
        })
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.inner.lock().read_timeout = timeout;
        Ok(())
    }

    fn shutdown(&self) -> io::Result<()> {
        let mut state = self.inner.lock();
        state.closed = true;
        self.inner.cond.notify_all();
        Ok(())
    }
}

/// Poll `predicate` until it holds or `timeout` elapses.
pub fn wait_for(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    predicate()
}
