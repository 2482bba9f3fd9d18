use serde::{Deserialize, Serialize};

use super::{lenient_number, Applied, Record};

/// One song, from the database or the queue
///
/// Every metadata field is optional; the server only sends tags that
/// exist. Malformed numeric tags parse as `None` rather than failing the
/// response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Path of the song relative to the music directory (`file:` key)
    pub uri: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub track_no: Option<u32>,
    pub disc: Option<u32>,
    /// Duration in seconds; from `duration:` (fractional) with `Time:` as
    /// the whole-second fallback on older servers
    pub duration: Option<f64>,
    /// Queue position, present only for queue listings
    pub position: Option<u32>,
    /// Queue song id, present only for queue listings
    pub id: Option<u32>,
    pub last_modified: Option<String>,
    /// True once `duration:` set the field, so a whole-second `Time:`
    /// cannot clobber it and vice versa
    #[serde(skip)]
    pub(crate) duration_exact: bool,
}

impl Track {
    fn set_string(slot: &mut Option<String>, value: &str) -> Applied {
        if slot.is_some() {
            return Applied::Duplicate;
        }
        *slot = Some(value.to_string());
        Applied::Set
    }

    fn set_number<T: std::str::FromStr>(slot: &mut Option<T>, value: &str) -> Applied {
        if slot.is_some() {
            return Applied::Duplicate;
        }
        // Leaves the slot unset on malformed input, but the key still
        // counted: sentinel unknown instead of a failed response.
        *slot = lenient_number(value);
        Applied::Set
    }
}

impl Record for Track {
    fn is_leading_key(key: &str) -> bool {
        key.eq_ignore_ascii_case("file")
    }

    fn apply(&mut self, key: &str, value: &str) -> Applied {
        if key.eq_ignore_ascii_case("file") {
            if !self.uri.is_empty() {
                return Applied::Duplicate;
            }
            self.uri = value.to_string();
            return Applied::Set;
        }
        if key.eq_ignore_ascii_case("title") {
            return Self::set_string(&mut self.title, value);
        }
        if key.eq_ignore_ascii_case("artist") {
            return Self::set_string(&mut self.artist, value);
        }
        if key.eq_ignore_ascii_case("albumartist") {
            return Self::set_string(&mut self.album_artist, value);
        }
        if key.eq_ignore_ascii_case("album") {
            return Self::set_string(&mut self.album, value);
        }
        if key.eq_ignore_ascii_case("genre") {
            return Self::set_string(&mut self.genre, value);
        }
        if key.eq_ignore_ascii_case("date") {
            return Self::set_string(&mut self.date, value);
        }
        if key.eq_ignore_ascii_case("track") {
            return Self::set_number(&mut self.track_no, value);
        }
        if key.eq_ignore_ascii_case("disc") {
            return Self::set_number(&mut self.disc, value);
        }
        if key == "duration" {
            if self.duration_exact {
                return Applied::Duplicate;
            }
            // Fractional seconds; overrides a whole-second Time fallback.
            self.duration = value.trim().parse().ok();
            self.duration_exact = true;
            return Applied::Set;
        }
        if key.eq_ignore_ascii_case("time") {
            if self.duration_exact {
                return Applied::Set;
            }
            if self.duration.is_some() {
                return Applied::Duplicate;
            }
            self.duration = lenient_number::<u64>(value).map(|s| s as f64);
            return Applied::Set;
        }
        if key.eq_ignore_ascii_case("pos") {
            return Self::set_number(&mut self.position, value);
        }
        if key.eq_ignore_ascii_case("id") {
            return Self::set_number(&mut self.id, value);
        }
        if key.eq_ignore_ascii_case("last-modified") {
            return Self::set_string(&mut self.last_modified, value);
        }
        Applied::Ignored
    }
}
