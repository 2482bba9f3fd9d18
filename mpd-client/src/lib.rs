//! Sync-first MPD client
//!
//! One TCP connection, shared between blocking command calls from any
//! thread and a background idle loop that turns server pushes into
//! listener callbacks. The wire format and the typed parsers live in the
//! `mpd-protocol` crate; this crate owns sockets, threads, and lifecycle.
//!
//! ```no_run
//! use mpd_client::{ClientConfig, MpdClient};
//!
//! let client = MpdClient::connect(ClientConfig::default())?;
//! let status = client.status()?;
//! println!("player is {:?}", status.state);
//!
//! for changes in client.events().take(3) {
//!     println!("changed: {changes:?}");
//! }
//! # Ok::<(), mpd_client::ClientError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
mod idle;
pub mod listener;
pub mod logging;
pub mod session;
pub mod wire;

mod playback;
mod queries;

pub use client::MpdClient;
pub use config::{ClientConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{ClientError, Result};
pub use listener::{
    ConnectionListener, ListenerId, SubsystemEvents, SubsystemListener,
};
pub use session::ConnectionState;
pub use wire::Wire;

// The protocol types callers see in this crate's signatures.
pub use mpd_protocol::{
    Ack, AckCode, Album, Artist, Filter, Listing, Output, Partition, Playlist, PlayState,
    ProtocolError, Statistics, Status, Subsystem, SubsystemSet, Tag, Track, Version,
};
