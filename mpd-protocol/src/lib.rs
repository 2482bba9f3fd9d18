//! Wire codec and typed parsers for the MPD line protocol
//!
//! This crate knows nothing about sockets or threads. It turns typed
//! commands into newline-terminated wire text, decodes response lines into
//! key/value pairs or protocol sentinels (`OK` / `ACK`), and reassembles
//! flat key/value streams into typed domain entities.
//!
//! The connection handling lives in the `mpd-client` crate, which consumes
//! this one.

pub mod command;
pub mod entity;
pub mod error;
pub mod filter;
pub mod response;
pub mod select;
pub mod subsystem;
pub mod version;

pub use command::Command;
pub use error::{Ack, AckCode, ProtocolError, Result};
pub use filter::{Filter, Tag};
pub use response::{decode_line, ResponseLine};
pub use subsystem::{Subsystem, SubsystemSet};
pub use version::Version;

pub use entity::{
    Album, Artist, Directory, Listing, Output, Partition, Playlist, PlayState, Record, Records,
    Statistics, Status, Track,
};
