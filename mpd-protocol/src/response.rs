//! Response line decoding
//!
//! A response is a sequence of `key: value` lines terminated by `OK` (or
//! `list_OK` inside command lists), or aborted by an `ACK` error line. An
//! `ACK` is authoritative wherever it appears: decoding surfaces it and the
//! caller must stop parsing the current response. `binary: <len>` announces
//! a raw byte chunk; consuming those bytes is the reader's job since this
//! module never touches the socket.

use crate::error::{Ack, AckCode, ProtocolError, Result};

/// One decoded line of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseLine {
    /// A `key: value` pair. Values may contain colons; only the first
    /// `": "` separates key from value.
    Field { key: String, value: String },
    /// Successful end of response
    Ok,
    /// Sub-response terminator inside `command_list_ok_begin` lists
    ListOk,
    /// Structured server error; terminates the response
    Ack(Ack),
    /// Announces `len` raw bytes following this line
    Binary(usize),
}

/// Decode a single line (without its trailing newline)
pub fn decode_line(line: &str) -> Result<ResponseLine> {
    if line == "OK" {
        return Ok(ResponseLine::Ok);
    }
    if line == "list_OK" {
        return Ok(ResponseLine::ListOk);
    }
    if let Some(rest) = line.strip_prefix("ACK ") {
        return parse_ack(rest).map(ResponseLine::Ack);
    }
    if let Some((key, value)) = line.split_once(": ") {
        if key == "binary" {
            let len = value
                .parse::<usize>()
                .map_err(|_| ProtocolError::InvalidBinaryLength(value.to_string()))?;
            return Ok(ResponseLine::Binary(len));
        }
        return Ok(ResponseLine::Field {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    // A bare "key:" with an empty value carries no space after the colon.
    if let Some(key) = line.strip_suffix(':') {
        if !key.is_empty() && !key.contains(' ') {
            return Ok(ResponseLine::Field {
                key: key.to_string(),
                value: String::new(),
            });
        }
    }
    Err(ProtocolError::MalformedLine(line.to_string()))
}

/// Parse the remainder of an ACK line: `[<code>@<index>] {<command>} <message>`
fn parse_ack(rest: &str) -> Result<Ack> {
    let malformed = || ProtocolError::MalformedAck(format!("ACK {rest}"));

    let rest = rest.strip_prefix('[').ok_or_else(malformed)?;
    let (codes, rest) = rest.split_once(']').ok_or_else(malformed)?;
    let (code, index) = codes.split_once('@').ok_or_else(malformed)?;
    let code = code.parse::<u32>().map_err(|_| malformed())?;
    let command_index = index.parse::<usize>().map_err(|_| malformed())?;

    let rest = rest.trim_start();
    let rest = rest.strip_prefix('{').ok_or_else(malformed)?;
    let (command, message) = rest.split_once('}').ok_or_else(malformed)?;

    Ok(Ack {
        code: AckCode::from_raw(code),
        command_index,
        command: command.to_string(),
        message: message.trim_start().to_string(),
    })
}
