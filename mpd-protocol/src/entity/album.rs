use serde::{Deserialize, Serialize};

use super::{Applied, Record};
use crate::filter::Tag;

/// An album, from a grouped `list album` enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    /// The group value when listing `album group albumartist`
    pub artist: Option<String>,
    /// The group value when listing `album group date`
    pub date: Option<String>,
}

/// An artist name from a `list artist` / `list albumartist` enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Record for Artist {
    fn is_leading_key(key: &str) -> bool {
        // `list artist` answers with `Artist:` lines, `list albumartist`
        // with `AlbumArtist:`; both carry one name per record.
        key.eq_ignore_ascii_case("artist") || key.eq_ignore_ascii_case("albumartist")
    }

    fn apply(&mut self, key: &str, value: &str) -> Applied {
        if Self::is_leading_key(key) {
            if !self.name.is_empty() {
                return Applied::Duplicate;
            }
            self.name = value.to_string();
            return Applied::Set;
        }
        Applied::Ignored
    }
}

/// Fold a grouped `list album` response into albums
///
/// Grouped enumerations invert the usual record order: the group key
/// (`AlbumArtist: X`) arrives once and applies to every `Album:` line that
/// follows, until the next group value. The generic duplicate-key rule
/// cannot express that, so albums get their own carry-forward fold.
pub fn parse_albums(pairs: Vec<(String, String)>, group: Option<Tag>) -> Vec<Album> {
    let group_key = group.map(|t| t.as_str());
    let mut albums = Vec::new();
    let mut carried: Option<String> = None;

    for (key, value) in pairs {
        if key.eq_ignore_ascii_case("album") {
            let mut album = Album {
                name: value,
                ..Album::default()
            };
            match group {
                Some(Tag::Date) => album.date = carried.clone(),
                Some(_) => album.artist = carried.clone(),
                None => {}
            }
            albums.push(album);
        } else if group_key.is_some_and(|g| key.eq_ignore_ascii_case(g)) {
            carried = Some(value);
        } else {
            tracing::trace!("unhandled list key {:?}", key);
        }
    }

    albums
}
