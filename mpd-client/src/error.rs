use mpd_protocol::{Ack, ProtocolError};
use thiserror::Error;

/// Errors surfaced by the client facade.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The TCP dial, greeting, or handshake failed.
    #[error("failed to connect: {0}")]
    Connect(String),

    /// The server rejected the configured password.
    #[error("authentication rejected: {0}")]
    AuthRejected(Ack),

    /// The connection died mid-session. Covers socket errors, an EOF from
    /// the server, and a command watchdog expiry.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The server answered, but with an error or a malformed response.
    /// The connection stays usable.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// No connection is established and auto-reconnect is off.
    #[error("not connected")]
    Disconnected,
}

impl ClientError {
    /// The server's error reply, if this is one.
    pub fn ack(&self) -> Option<&Ack> {
        match self {
            ClientError::Protocol(ProtocolError::Ack(ack)) => Some(ack),
            ClientError::AuthRejected(ack) => Some(ack),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
