use serde::{Deserialize, Serialize};

use super::lenient_number;

/// Playback state reported in `status`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    Play,
    Pause,
    #[default]
    Stop,
}

impl PlayState {
    fn from_wire(value: &str) -> Self {
        match value {
            "play" => PlayState::Play,
            "pause" => PlayState::Pause,
            "stop" => PlayState::Stop,
            other => {
                tracing::debug!("unknown playback state {:?}, treating as stopped", other);
                PlayState::Stop
            }
        }
    }
}

/// Snapshot of player state, from the `status` command
///
/// A single-record response: parsed directly from the pair list, last
/// value wins, unknown fields become `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub state: PlayState,
    /// 0-100; the server reports -1 when no mixer exists
    pub volume: Option<u8>,
    pub repeat: bool,
    pub random: bool,
    pub single: bool,
    pub consume: bool,
    pub queue_version: Option<u32>,
    pub queue_length: Option<u32>,
    /// Queue position of the current song
    pub song: Option<u32>,
    pub song_id: Option<u32>,
    pub elapsed: Option<f64>,
    pub duration: Option<f64>,
    pub bitrate: Option<u32>,
    pub partition: Option<String>,
    /// Database update job id while an update runs
    pub updating_db: Option<u32>,
    /// Human-readable server-side error, cleared with `clearerror`
    pub error: Option<String>,
}

impl Status {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut status = Status::default();
        for (key, value) in pairs {
            match key.as_str() {
                "state" => status.state = PlayState::from_wire(value),
                "volume" => {
                    status.volume = value.parse::<i16>().ok().filter(|v| *v >= 0).map(|v| v as u8)
                }
                "repeat" => status.repeat = value == "1",
                "random" => status.random = value == "1",
                "single" => status.single = value == "1",
                "consume" => status.consume = value == "1",
                "playlist" => status.queue_version = lenient_number(value),
                "playlistlength" => status.queue_length = lenient_number(value),
                "song" => status.song = lenient_number(value),
                "songid" => status.song_id = lenient_number(value),
                "elapsed" => status.elapsed = value.parse().ok(),
                "duration" => status.duration = value.parse().ok(),
                "bitrate" => status.bitrate = lenient_number(value),
                "partition" => status.partition = Some(value.clone()),
                "updating_db" => status.updating_db = lenient_number(value),
                "error" => status.error = Some(value.clone()),
                other => tracing::trace!("unhandled status key {:?}", other),
            }
        }
        status
    }
}

/// Database and server statistics, from the `stats` command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub artists: Option<u64>,
    pub albums: Option<u64>,
    pub songs: Option<u64>,
    /// Daemon uptime in seconds
    pub uptime: Option<u64>,
    /// Accumulated play time in seconds
    pub playtime: Option<u64>,
    /// Total duration of the database in seconds
    pub db_playtime: Option<u64>,
    /// Unix timestamp of the last database update
    pub db_update: Option<u64>,
}

impl Statistics {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut stats = Statistics::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "artists" => &mut stats.artists,
                "albums" => &mut stats.albums,
                "songs" => &mut stats.songs,
                "uptime" => &mut stats.uptime,
                "playtime" => &mut stats.playtime,
                "db_playtime" => &mut stats.db_playtime,
                "db_update" => &mut stats.db_update,
                other => {
                    tracing::trace!("unhandled stats key {:?}", other);
                    continue;
                }
            };
            *slot = lenient_number(value);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::super::pairs;
    use super::*;

    #[test]
    fn test_status_parsing() {
        let status = Status::from_pairs(&pairs(&[
            ("volume", "70"),
            ("repeat", "0"),
            ("random", "1"),
            ("single", "0"),
            ("consume", "0"),
            ("playlist", "31"),
            ("playlistlength", "12"),
            ("state", "play"),
            ("song", "4"),
            ("songid", "90"),
            ("elapsed", "123.456"),
            ("duration", "561.640"),
            ("bitrate", "1411"),
            ("partition", "default"),
        ]));
        assert_eq!(status.state, PlayState::Play);
        assert_eq!(status.volume, Some(70));
        assert!(status.random);
        assert!(!status.repeat);
        assert_eq!(status.song, Some(4));
        assert_eq!(status.elapsed, Some(123.456));
        assert_eq!(status.partition.as_deref(), Some("default"));
        assert_eq!(status.error, None);
    }

    #[test]
    fn test_negative_volume_means_no_mixer() {
        let status = Status::from_pairs(&pairs(&[("volume", "-1")]));
        assert_eq!(status.volume, None);
    }

    #[test]
    fn test_malformed_fields_degrade_to_unknown() {
        let status = Status::from_pairs(&pairs(&[
            ("state", "warp"),
            ("song", "four"),
            ("elapsed", "abc"),
        ]));
        assert_eq!(status.state, PlayState::Stop);
        assert_eq!(status.song, None);
        assert_eq!(status.elapsed, None);
    }

    #[test]
    fn test_statistics_parsing() {
        let stats = Statistics::from_pairs(&pairs(&[
            ("artists", "64"),
            ("albums", "128"),
            ("songs", "1024"),
            ("uptime", "4000"),
            ("db_playtime", "360000"),
            ("db_update", "1714000000"),
            ("playtime", "9000"),
        ]));
        assert_eq!(stats.songs, Some(1024));
        assert_eq!(stats.db_update, Some(1714000000));
    }
}
