//! Post-parse selection and ordering policies
//!
//! Pure functions applied over completed entity sequences. Parsing never
//! reorders or merges; these helpers encode the display policies shared by
//! consumers of the SDK.

use crate::entity::{Album, Track};

/// The artist to display for a track: album artist when tagged, falling
/// back to the track artist
pub fn effective_artist(track: &Track) -> Option<&str> {
    track
        .album_artist
        .as_deref()
        .or(track.artist.as_deref())
}

/// Order tracks by disc, then track number; unknown numbers sort last
pub fn sort_tracks(tracks: &mut [Track]) {
    tracks.sort_by_key(|t| {
        (
            t.disc.unwrap_or(u32::MAX),
            t.track_no.unwrap_or(u32::MAX),
        )
    });
}

/// Order albums by release date descending (newest first); undated albums
/// keep alphabetical order at the end
pub fn sort_albums_by_date(albums: &mut [Album]) {
    albums.sort_by(|a, b| match (&a.date, &b.date) {
        (Some(da), Some(db)) => db.cmp(da).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
}

/// Drop consecutive duplicate albums (same name and artist), as produced
/// by grouped enumerations that repeat an album per disc or per date
pub fn dedupe_albums(albums: Vec<Album>) -> Vec<Album> {
    let mut result: Vec<Album> = Vec::with_capacity(albums.len());
    for album in albums {
        let duplicate = result
            .last()
            .is_some_and(|prev| prev.name == album.name && prev.artist == album.artist);
        if !duplicate {
            result.push(album);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(artist: Option<&str>, album_artist: Option<&str>) -> Track {
        Track {
            artist: artist.map(String::from),
            album_artist: album_artist.map(String::from),
            ..Track::default()
        }
    }

    fn album(name: &str, artist: Option<&str>, date: Option<&str>) -> Album {
        Album {
            name: name.to_string(),
            artist: artist.map(String::from),
            date: date.map(String::from),
        }
    }

    #[test]
    fn test_effective_artist_prefers_album_artist() {
        assert_eq!(
            effective_artist(&track(Some("Feat. Artist"), Some("Album Artist"))),
            Some("Album Artist")
        );
        assert_eq!(
            effective_artist(&track(Some("Solo"), None)),
            Some("Solo")
        );
        assert_eq!(effective_artist(&track(None, None)), None);
    }

    #[test]
    fn test_sort_tracks_disc_then_number() {
        let mut tracks = vec![
            Track {
                disc: Some(2),
                track_no: Some(1),
                ..Track::default()
            },
            Track {
                disc: Some(1),
                track_no: Some(2),
                ..Track::default()
            },
            Track {
                disc: Some(1),
                track_no: Some(1),
                ..Track::default()
            },
            Track {
                disc: None,
                track_no: None,
                ..Track::default()
            },
        ];
        sort_tracks(&mut tracks);
        assert_eq!(tracks[0].disc, Some(1));
        assert_eq!(tracks[0].track_no, Some(1));
        assert_eq!(tracks[1].track_no, Some(2));
        assert_eq!(tracks[2].disc, Some(2));
        assert_eq!(tracks[3].disc, None);
    }

    #[test]
    fn test_sort_albums_newest_first() {
        let mut albums = vec![
            album("Old", None, Some("1971")),
            album("Undated", None, None),
            album("New", None, Some("2020")),
        ];
        sort_albums_by_date(&mut albums);
        assert_eq!(albums[0].name, "New");
        assert_eq!(albums[1].name, "Old");
        assert_eq!(albums[2].name, "Undated");
    }

    #[test]
    fn test_dedupe_consecutive_albums() {
        let albums = vec![
            album("A", Some("X"), Some("2001")),
            album("A", Some("X"), Some("2002")),
            album("A", Some("Y"), None),
        ];
        let deduped = dedupe_albums(albums);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[1].artist.as_deref(), Some("Y"));
    }
}
