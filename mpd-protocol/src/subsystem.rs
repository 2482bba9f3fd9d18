//! Server subsystems and idle change sets
//!
//! The server reports state changes per named subsystem. One
//! [`SubsystemSet`] is built per idle wake-up and handed, immutable, to
//! every registered listener.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A named category of server-side state reported by the idle command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subsystem {
    Database,
    Update,
    StoredPlaylist,
    Playlist,
    Player,
    Mixer,
    Output,
    Options,
    Partition,
    Sticker,
    Subscription,
    Message,
    Neighbor,
    Mount,
}

impl Subsystem {
    pub const ALL: [Subsystem; 14] = [
        Subsystem::Database,
        Subsystem::Update,
        Subsystem::StoredPlaylist,
        Subsystem::Playlist,
        Subsystem::Player,
        Subsystem::Mixer,
        Subsystem::Output,
        Subsystem::Options,
        Subsystem::Partition,
        Subsystem::Sticker,
        Subsystem::Subscription,
        Subsystem::Message,
        Subsystem::Neighbor,
        Subsystem::Mount,
    ];

    /// The wire name used in `changed:` lines and `idle` arguments
    pub fn name(&self) -> &'static str {
        match self {
            Subsystem::Database => "database",
            Subsystem::Update => "update",
            Subsystem::StoredPlaylist => "stored_playlist",
            Subsystem::Playlist => "playlist",
            Subsystem::Player => "player",
            Subsystem::Mixer => "mixer",
            Subsystem::Output => "output",
            Subsystem::Options => "options",
            Subsystem::Partition => "partition",
            Subsystem::Sticker => "sticker",
            Subsystem::Subscription => "subscription",
            Subsystem::Message => "message",
            Subsystem::Neighbor => "neighbor",
            Subsystem::Mount => "mount",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Subsystem::ALL.iter().copied().find(|s| s.name() == name)
    }

    /// The single-subsystem change set for this subsystem
    pub fn flag(&self) -> SubsystemSet {
        match self {
            Subsystem::Database => SubsystemSet::DATABASE,
            Subsystem::Update => SubsystemSet::UPDATE,
            Subsystem::StoredPlaylist => SubsystemSet::STORED_PLAYLIST,
            Subsystem::Playlist => SubsystemSet::PLAYLIST,
            Subsystem::Player => SubsystemSet::PLAYER,
            Subsystem::Mixer => SubsystemSet::MIXER,
            Subsystem::Output => SubsystemSet::OUTPUT,
            Subsystem::Options => SubsystemSet::OPTIONS,
            Subsystem::Partition => SubsystemSet::PARTITION,
            Subsystem::Sticker => SubsystemSet::STICKER,
            Subsystem::Subscription => SubsystemSet::SUBSCRIPTION,
            Subsystem::Message => SubsystemSet::MESSAGE,
            Subsystem::Neighbor => SubsystemSet::NEIGHBOR,
            Subsystem::Mount => SubsystemSet::MOUNT,
        }
    }
}

bitflags! {
    /// Fixed-size set of changed subsystems, one flag per subsystem
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SubsystemSet: u16 {
        const DATABASE        = 1 << 0;
        const UPDATE          = 1 << 1;
        const STORED_PLAYLIST = 1 << 2;
        const PLAYLIST        = 1 << 3;
        const PLAYER          = 1 << 4;
        const MIXER           = 1 << 5;
        const OUTPUT          = 1 << 6;
        const OPTIONS         = 1 << 7;
        const PARTITION       = 1 << 8;
        const STICKER         = 1 << 9;
        const SUBSCRIPTION    = 1 << 10;
        const MESSAGE         = 1 << 11;
        const NEIGHBOR        = 1 << 12;
        const MOUNT           = 1 << 13;
    }
}

impl SubsystemSet {
    /// Build a change set from `changed:` values
    ///
    /// Names this client does not know are logged and skipped so that a
    /// newer server cannot break notification delivery.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = SubsystemSet::empty();
        for name in names {
            match Subsystem::from_name(name) {
                Some(subsystem) => set |= subsystem.flag(),
                None => tracing::debug!("ignoring unknown changed subsystem {:?}", name),
            }
        }
        set
    }

    pub fn contains_subsystem(&self, subsystem: Subsystem) -> bool {
        self.contains(subsystem.flag())
    }

    /// The changed subsystems, in declaration order
    pub fn subsystems(&self) -> impl Iterator<Item = Subsystem> + '_ {
        Subsystem::ALL
            .into_iter()
            .filter(|s| self.contains_subsystem(*s))
    }
}

impl FromIterator<Subsystem> for SubsystemSet {
    fn from_iter<T: IntoIterator<Item = Subsystem>>(iter: T) -> Self {
        iter.into_iter()
            .fold(SubsystemSet::empty(), |set, s| set | s.flag())
    }
}
