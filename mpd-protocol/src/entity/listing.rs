use serde::{Deserialize, Serialize};

use super::{Applied, Record, Track};

/// A directory entry from `lsinfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub path: String,
    pub last_modified: Option<String>,
}

impl Record for Directory {
    fn is_leading_key(key: &str) -> bool {
        key.eq_ignore_ascii_case("directory")
    }

    fn apply(&mut self, key: &str, value: &str) -> Applied {
        if key.eq_ignore_ascii_case("directory") {
            if !self.path.is_empty() {
                return Applied::Duplicate;
            }
            self.path = value.to_string();
            return Applied::Set;
        }
        if key.eq_ignore_ascii_case("last-modified") {
            if self.last_modified.is_some() {
                return Applied::Duplicate;
            }
            self.last_modified = Some(value.to_string());
            return Applied::Set;
        }
        Applied::Ignored
    }
}

/// A stored playlist from `listplaylists` or `lsinfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub last_modified: Option<String>,
}

impl Record for Playlist {
    fn is_leading_key(key: &str) -> bool {
        key.eq_ignore_ascii_case("playlist")
    }

    fn apply(&mut self, key: &str, value: &str) -> Applied {
        if key.eq_ignore_ascii_case("playlist") {
            if !self.name.is_empty() {
                return Applied::Duplicate;
            }
            self.name = value.to_string();
            return Applied::Set;
        }
        if key.eq_ignore_ascii_case("last-modified") {
            if self.last_modified.is_some() {
                return Applied::Duplicate;
            }
            self.last_modified = Some(value.to_string());
            return Applied::Set;
        }
        Applied::Ignored
    }
}

/// The mixed contents of one directory level, from `lsinfo`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub directories: Vec<Directory>,
    pub playlists: Vec<Playlist>,
    pub tracks: Vec<Track>,
}

/// Segment a mixed `lsinfo` response
///
/// Three record types interleave in one stream; `directory:`, `playlist:`
/// and `file:` each open a record of their kind and close whichever record
/// was in progress.
pub fn parse_listing(pairs: Vec<(String, String)>) -> Listing {
    enum Node {
        None,
        Dir(Directory),
        Pl(Playlist),
        Song(Track),
    }

    let mut listing = Listing::default();
    let mut current = Node::None;

    let mut flush = |node: &mut Node, listing: &mut Listing| {
        match std::mem::replace(node, Node::None) {
            Node::None => {}
            Node::Dir(d) => listing.directories.push(d),
            Node::Pl(p) => listing.playlists.push(p),
            Node::Song(t) => listing.tracks.push(t),
        }
    };

    for (key, value) in pairs {
        if Directory::is_leading_key(&key) {
            flush(&mut current, &mut listing);
            let mut dir = Directory::default();
            dir.apply(&key, &value);
            current = Node::Dir(dir);
        } else if Playlist::is_leading_key(&key) {
            flush(&mut current, &mut listing);
            let mut pl = Playlist::default();
            pl.apply(&key, &value);
            current = Node::Pl(pl);
        } else if Track::is_leading_key(&key) {
            flush(&mut current, &mut listing);
            let mut track = Track::default();
            track.apply(&key, &value);
            current = Node::Song(track);
        } else {
            match &mut current {
                Node::None => tracing::trace!("lsinfo key before any record: {:?}", key),
                Node::Dir(d) => {
                    d.apply(&key, &value);
                }
                Node::Pl(p) => {
                    p.apply(&key, &value);
                }
                Node::Song(t) => {
                    t.apply(&key, &value);
                }
            }
        }
    }
    flush(&mut current, &mut listing);

    listing
}
