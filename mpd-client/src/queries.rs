//! Read-only command surface: status, library browsing, and album art.

use mpd_protocol::entity::{collect_records, parse_albums, parse_listing};
use mpd_protocol::select::{dedupe_albums, sort_albums_by_date, sort_tracks};
use mpd_protocol::{
    Album, Artist, Command, Filter, Listing, Output, Partition, Playlist, Statistics, Status, Tag,
    Track,
};

use crate::client::MpdClient;
use crate::error::Result;
use crate::wire::Wire;

impl<W: Wire> MpdClient<W> {
    /// Player state, volume, queue version, and the rest of `status`.
    pub fn status(&self) -> Result<Status> {
        let fields = self.exchange(Command::new("status"))?;
        Ok(Status::from_pairs(&fields))
    }

    /// Database and uptime counters from `stats`.
    pub fn statistics(&self) -> Result<Statistics> {
        let fields = self.exchange(Command::new("stats"))?;
        Ok(Statistics::from_pairs(&fields))
    }

    /// The song the player is on, if any.
    pub fn current_song(&self) -> Result<Option<Track>> {
        let fields = self.exchange(Command::new("currentsong"))?;
        Ok(collect_records(fields).into_iter().next())
    }

    /// The play queue in queue order.
    pub fn queue(&self) -> Result<Vec<Track>> {
        let fields = self.exchange(Command::new("playlistinfo"))?;
        Ok(collect_records(fields))
    }

    /// Exact-match database search.
    pub fn find(&self, filters: &[Filter]) -> Result<Vec<Track>> {
        let mut command = Command::new("find");
        for filter in filters {
            command = command.filter(filter);
        }
        Ok(collect_records(self.exchange(command)?))
    }

    /// Every track below a database directory, in disc/track order.
    pub fn tracks_under(&self, path: &str) -> Result<Vec<Track>> {
        let mut tracks = self.find(&[Filter::base(path)])?;
        sort_tracks(&mut tracks);
        Ok(tracks)
    }

    /// Albums, newest first, optionally restricted to one album artist.
    /// Grouping by album artist keeps same-named albums by different
    /// artists apart.
    pub fn albums(&self, artist: Option<&str>) -> Result<Vec<Album>> {
        let mut command = Command::new("list").arg("album");
        if let Some(artist) = artist {
            command = command.filter(&Filter::tag(Tag::AlbumArtist, artist));
        }
        command = command.arg("group").arg(Tag::AlbumArtist);

        let fields = self.exchange(command)?;
        let mut albums = dedupe_albums(parse_albums(fields, Some(Tag::AlbumArtist)));
        sort_albums_by_date(&mut albums);
        Ok(albums)
    }

    /// All artists. `by_album_artist` lists the AlbumArtist tag instead of
    /// the per-track Artist tag.
    pub fn artists(&self, by_album_artist: bool) -> Result<Vec<Artist>> {
        let tag = if by_album_artist {
            Tag::AlbumArtist
        } else {
            Tag::Artist
        };
        let fields = self.exchange(Command::new("list").arg(tag))?;
        Ok(collect_records(fields))
    }

    /// Distinct values of one tag, optionally filtered.
    pub fn list(&self, tag: Tag, filters: &[Filter]) -> Result<Vec<String>> {
        let mut command = Command::new("list").arg(tag);
        for filter in filters {
            command = command.filter(filter);
        }
        let fields = self.exchange(command)?;
        Ok(fields
            .into_iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(tag.as_str()))
            .map(|(_, value)| value)
            .collect())
    }

    /// One level of the database hierarchy: subdirectories, playlists, and
    /// tracks directly under `path` (the root when `None`).
    pub fn listing(&self, path: Option<&str>) -> Result<Listing> {
        let fields = self.exchange(Command::new("lsinfo").opt_arg(path))?;
        Ok(parse_listing(fields))
    }

    /// Stored playlists.
    pub fn playlists(&self) -> Result<Vec<Playlist>> {
        let fields = self.exchange(Command::new("listplaylists"))?;
        Ok(collect_records(fields))
    }

    /// Contents of one stored playlist, in playlist order.
    pub fn playlist_tracks(&self, name: &str) -> Result<Vec<Track>> {
        let fields = self.exchange(Command::new("listplaylistinfo").arg(name))?;
        Ok(collect_records(fields))
    }

    /// Audio outputs with their enabled flags.
    pub fn outputs(&self) -> Result<Vec<Output>> {
        let fields = self.exchange(Command::new("outputs"))?;
        Ok(collect_records(fields))
    }

    /// Partitions known to the server. Needs protocol 0.22.
    pub fn partitions(&self) -> Result<Vec<Partition>> {
        let fields = self.exchange(Command::new("listpartitions"))?;
        Ok(collect_records(fields))
    }

    /// Cover art stored next to the song, fetched chunk by chunk until the
    /// advertised total size is reached. Needs protocol 0.21.
    pub fn album_art(&self, uri: &str) -> Result<Vec<u8>> {
        let mut art = Vec::new();
        loop {
            let offset = art.len();
            let fields = self.exchange_binary(
                Command::new("albumart").arg(uri).arg(offset),
                &mut art,
            )?;

            let total: usize = fields
                .iter()
                .find(|(key, _)| key == "size")
                .and_then(|(_, value)| value.parse().ok())
                .unwrap_or(art.len());

            if art.len() >= total || art.len() == offset {
                return Ok(art);
            }
        }
    }
}
