//! Protocol version from the server greeting
//!
//! The greeting banner is `OK MPD <major>.<minor>.<patch>`. The version is
//! used by callers to gate features that older servers reject; the session
//! itself never enforces these gates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Protocol version announced in the greeting banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a full greeting banner, e.g. `OK MPD 0.24.0`
    pub fn from_greeting(banner: &str) -> Result<Self, ProtocolError> {
        let banner = banner.trim_end();
        banner
            .strip_prefix("OK MPD ")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ProtocolError::BadGreeting(banner.to_string()))
    }

    /// Partition commands (`partition`, `listpartitions`, `moveoutput`)
    pub fn supports_partitions(&self) -> bool {
        *self >= Version::new(0, 22, 0)
    }

    /// Binary album art (`albumart`, `readpicture`)
    pub fn supports_binary(&self) -> bool {
        *self >= Version::new(0, 21, 0)
    }

    /// Client-to-client messages (`subscribe`, `sendmessage`)
    pub fn supports_messages(&self) -> bool {
        *self >= Version::new(0, 17, 0)
    }

    /// Mount and neighbor enumeration (`listmounts`, `listneighbors`)
    pub fn supports_mounts(&self) -> bool {
        *self >= Version::new(0, 19, 0)
    }
}

impl FromStr for Version {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ProtocolError::BadGreeting(s.to_string());
        let mut parts = s.trim().splitn(3, '.');
        let mut next = || -> Result<u32, ProtocolError> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or_else(bad)
        };
        Ok(Self {
            major: next()?,
            minor: next()?,
            patch: next()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
