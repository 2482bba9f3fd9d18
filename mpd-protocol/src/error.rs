use std::fmt;

use thiserror::Error;

/// Errors produced while encoding or decoding protocol text
///
/// These cover the wire format only. Socket-level failures (refused
/// connections, lost connections) belong to the client crate.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A response line that is neither `key: value`, `OK`, `ACK`, nor a
    /// binary-length marker
    #[error("malformed response line: {0:?}")]
    MalformedLine(String),

    /// The server greeting did not match `OK MPD <version>`
    #[error("unrecognized greeting: {0:?}")]
    BadGreeting(String),

    /// An `ACK` line whose bracket structure could not be parsed
    #[error("malformed ACK line: {0:?}")]
    MalformedAck(String),

    /// The server rejected the command with a structured error
    #[error("server error: {0}")]
    Ack(Ack),

    /// A `binary:` marker with a length that is not a valid byte count
    #[error("invalid binary length: {0:?}")]
    InvalidBinaryLength(String),
}

/// Result type for protocol-level operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Well-known ACK error codes
///
/// The numeric values are fixed by the protocol. Codes this crate does not
/// know about are preserved verbatim in [`AckCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckCode {
    NotList,
    Argument,
    Password,
    Permission,
    UnknownCommand,
    NoExist,
    PlaylistMax,
    System,
    PlaylistLoad,
    UpdateAlready,
    PlayerSync,
    Exist,
    Other(u32),
}

impl AckCode {
    pub fn from_raw(code: u32) -> Self {
        match code {
            1 => AckCode::NotList,
            2 => AckCode::Argument,
            3 => AckCode::Password,
            4 => AckCode::Permission,
            5 => AckCode::UnknownCommand,
            50 => AckCode::NoExist,
            51 => AckCode::PlaylistMax,
            52 => AckCode::System,
            53 => AckCode::PlaylistLoad,
            54 => AckCode::UpdateAlready,
            55 => AckCode::PlayerSync,
            56 => AckCode::Exist,
            other => AckCode::Other(other),
        }
    }

    pub fn as_raw(&self) -> u32 {
        match self {
            AckCode::NotList => 1,
            AckCode::Argument => 2,
            AckCode::Password => 3,
            AckCode::Permission => 4,
            AckCode::UnknownCommand => 5,
            AckCode::NoExist => 50,
            AckCode::PlaylistMax => 51,
            AckCode::System => 52,
            AckCode::PlaylistLoad => 53,
            AckCode::UpdateAlready => 54,
            AckCode::PlayerSync => 55,
            AckCode::Exist => 56,
            AckCode::Other(code) => *code,
        }
    }
}

/// A structured server error, parsed from an `ACK` line
///
/// Wire form: `ACK [<code>@<index>] {<command>} <message>`. The command
/// index identifies the failing command inside a command list; for single
/// commands it is always 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub code: AckCode,
    pub command_index: usize,
    pub command: String,
    pub message: String,
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ACK [{}@{}] {{{}}} {}",
            self.code.as_raw(),
            self.command_index,
            self.command,
            self.message
        )
    }
}
