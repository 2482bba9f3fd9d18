use std::io::{self, BufRead, BufReader, Read};
use std::time::Duration;

use mpd_protocol::{Command, ResponseLine, SubsystemSet, Version};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::wire::Wire;

/// Lifecycle of the client's single server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Connected, and no request is in flight.
    Connected,
    /// Parked in `idle`, waiting for the server to push a change.
    Idle,
    /// A command exchange is in progress.
    CommandActive,
}

/// One authenticated connection: a buffered reader plus a writer over the
/// same [`Wire`], with the greeting consumed and the password accepted.
///
/// A session is single-threaded by construction. Exclusive use is enforced
/// by the monitor in [`idle`](crate::idle), which hands the session to one
/// thread at a time.
pub struct Session<W: Wire> {
    reader: BufReader<W>,
    writer: W,
    version: Version,
    command_timeout: Duration,
}

impl<W: Wire> Session<W> {
    /// Consumes the greeting and authenticates if a password is set.
    ///
    /// The greeting read is bounded by `connect_timeout`. Every later
    /// exchange re-arms the read timeout to `command_timeout`.
    pub fn open(
        wire: W,
        password: Option<&str>,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self> {
        wire.set_read_timeout(Some(connect_timeout))
            .map_err(lost)?;
        let reader = BufReader::new(wire.try_clone().map_err(lost)?);
        let mut session = Session {
            reader,
            writer: wire,
            version: Version::new(0, 0, 0),
            command_timeout,
        };

        let greeting = session.read_line()?;
        session.version = Version::from_greeting(&greeting)?;
        tracing::debug!(version = %session.version, "connected");

        if let Some(password) = password {
            match session.exchange(&Command::new("password").arg(password)) {
                Ok(_) => tracing::debug!("password accepted"),
                Err(ClientError::Protocol(mpd_protocol::ProtocolError::Ack(ack))) => {
                    return Err(ClientError::AuthRejected(ack));
                }
                Err(other) => return Err(other),
            }
        }
        Ok(session)
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Spare writer for interrupting an in-flight `idle` from another thread.
    pub fn writer_clone(&self) -> io::Result<W> {
        self.writer.try_clone()
    }

    /// Sends one command and collects its `key: value` lines up to the
    /// terminator. The read timeout is armed for the whole exchange, so a
    /// server that goes silent mid-response surfaces as `ConnectionLost`.
    pub fn exchange(&mut self, command: &Command) -> Result<Vec<(String, String)>> {
        self.arm_watchdog()?;
        self.send(command)?;
        self.read_response(None)
    }

    /// Like [`exchange`](Self::exchange), but captures a `binary` chunk into
    /// `sink` alongside the regular fields.
    pub fn exchange_binary(
        &mut self,
        command: &Command,
        sink: &mut Vec<u8>,
    ) -> Result<Vec<(String, String)>> {
        self.arm_watchdog()?;
        self.send(command)?;
        self.read_response(Some(sink))
    }

    /// Enters idle mode. Clears the read timeout first so the follow-up
    /// [`read_idle_changes`](Self::read_idle_changes) can block indefinitely.
    pub fn enter_idle(&mut self) -> Result<()> {
        self.reader
            .get_ref()
            .set_read_timeout(None)
            .map_err(lost)?;
        self.send(&Command::new("idle"))
    }

    /// Blocks until the server ends the current idle period, either with
    /// pushed changes or with a bare `OK` after a `noidle`.
    pub fn read_idle_changes(&mut self) -> Result<SubsystemSet> {
        let fields = self.read_response(None)?;
        Ok(SubsystemSet::from_names(
            fields
                .iter()
                .filter(|(key, _)| key == "changed")
                .map(|(_, value)| value.as_str()),
        ))
    }

    fn arm_watchdog(&mut self) -> Result<()> {
        self.reader
            .get_ref()
            .set_read_timeout(Some(self.command_timeout))
            .map_err(lost)
    }

    fn send(&mut self, command: &Command) -> Result<()> {
        tracing::trace!(command = command.verb(), "send");
        self.writer
            .write_all(command.encode().as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(lost)
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).map_err(lost)?;
        if n == 0 {
            return Err(ClientError::ConnectionLost(
                "connection closed by server".into(),
            ));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    fn read_response(&mut self, mut sink: Option<&mut Vec<u8>>) -> Result<Vec<(String, String)>> {
        let mut fields = Vec::new();
        loop {
            let line = self.read_line()?;
            match mpd_protocol::decode_line(&line)? {
                ResponseLine::Ok => return Ok(fields),
                ResponseLine::ListOk => continue,
                ResponseLine::Ack(ack) => {
                    tracing::debug!(%ack, "server rejected command");
                    return Err(mpd_protocol::ProtocolError::Ack(ack).into());
                }
                ResponseLine::Field { key, value } => fields.push((key, value)),
                ResponseLine::Binary(len) => self.read_binary(len, sink.as_deref_mut())?,
            }
        }
    }

    /// Consumes `len` raw bytes plus the trailing newline. Without a sink the
    /// chunk is drained and dropped, which keeps the stream in sync even when
    /// a caller did not ask for binary data.
    fn read_binary(&mut self, len: usize, sink: Option<&mut Vec<u8>>) -> Result<()> {
        let mut chunk = vec![0u8; len];
        self.reader.read_exact(&mut chunk).map_err(lost)?;
        let mut newline = [0u8; 1];
        self.reader.read_exact(&mut newline).map_err(lost)?;
        if let Some(sink) = sink {
            sink.extend_from_slice(&chunk);
        }
        Ok(())
    }
}

fn lost(err: io::Error) -> ClientError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            ClientError::ConnectionLost("read timed out waiting for the server".into())
        }
        _ => ClientError::ConnectionLost(err.to_string()),
    }
}
