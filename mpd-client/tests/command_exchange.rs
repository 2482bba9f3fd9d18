//! Command exchanges over a scripted connection: handshake, queries,
//! server errors, binary transfers, and the command watchdog.

mod helpers;

use std::time::Duration;

use helpers::{mock_connection, mock_connection_with_greeting, wait_for};
use mpd_client::{
    AckCode, ClientConfig, ClientError, MpdClient, PlayState, ProtocolError, Tag, Version,
};

fn test_config() -> ClientConfig {
    ClientConfig::default().with_command_timeout(Duration::from_millis(500))
}

#[test]
fn handshake_records_protocol_version() {
    let (server, wire) = mock_connection();
    let client = MpdClient::over(wire, test_config()).unwrap();

    assert_eq!(client.protocol_version(), Some(Version::new(0, 24, 0)));
    assert!(server.commands().is_empty());
}

#[test]
fn foreign_greeting_fails_the_connect() {
    let (_server, wire) = mock_connection_with_greeting("220 smtp.example.com ESMTP\n");
    let err = MpdClient::over(wire, test_config()).unwrap_err();
    // Not talking to an MPD server is a failed connect, not a protocol
    // error on an established connection.
    assert!(matches!(err, ClientError::Connect(_)), "{err:?}");
}

#[test]
fn password_is_sent_before_anything_else() {
    let (server, wire) = mock_connection();
    let client =
        MpdClient::over(wire, test_config().with_password("hunter2")).unwrap();

    assert_eq!(server.commands(), vec!["password hunter2"]);
    drop(client);
}

#[test]
fn rejected_password_surfaces_as_auth_error() {
    let (server, wire) = mock_connection();
    server.respond_err("password wrong", "ACK [3@0] {password} incorrect password");

    let err = MpdClient::over(wire, test_config().with_password("wrong")).unwrap_err();
    match err {
        ClientError::AuthRejected(ack) => {
            assert_eq!(ack.code, AckCode::Password);
            assert_eq!(ack.command, "password");
        }
        other => panic!("expected AuthRejected, got {other:?}"),
    }
}

#[test]
fn status_fields_parse_into_typed_struct() {
    let (server, wire) = mock_connection();
    server.respond(
        "status",
        &[
            "volume: 70",
            "repeat: 0",
            "random: 1",
            "state: play",
            "song: 3",
            "songid: 17",
            "elapsed: 93.417",
            "playlistlength: 24",
        ],
    );

    let client = MpdClient::over(wire, test_config()).unwrap();
    let status = client.status().unwrap();

    assert_eq!(status.state, PlayState::Play);
    assert_eq!(status.volume, Some(70));
    assert!(status.random);
    assert!(!status.repeat);
    assert_eq!(status.song, Some(3));
    assert_eq!(status.song_id, Some(17));
    assert_eq!(status.elapsed, Some(93.417));
    assert_eq!(status.queue_length, Some(24));
}

#[test]
fn server_error_leaves_connection_usable() {
    let (server, wire) = mock_connection();
    server.respond_err("play 99", "ACK [50@0] {play} Bad song index");

    let client = MpdClient::over(wire, test_config()).unwrap();

    let err = client.play(Some(99)).unwrap_err();
    match &err {
        ClientError::Protocol(ProtocolError::Ack(ack)) => {
            assert_eq!(ack.code, AckCode::NoExist);
            assert_eq!(ack.message, "Bad song index");
        }
        other => panic!("expected server error, got {other:?}"),
    }

    // The failed command must not poison the stream.
    client.ping().unwrap();
    assert_eq!(server.commands(), vec!["play 99", "ping"]);
    assert_eq!(server.violations(), 0);
}

#[test]
fn find_quotes_arguments_with_spaces() {
    let (server, wire) = mock_connection();
    server.respond(
        "find artist \"Miles Davis\"",
        &["file: miles/so-what.flac", "Title: So What", "Artist: Miles Davis"],
    );

    let client = MpdClient::over(wire, test_config()).unwrap();
    let tracks = client
        .find(&[mpd_client::Filter::tag(Tag::Artist, "Miles Davis")])
        .unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].uri, "miles/so-what.flac");
    assert_eq!(tracks[0].title.as_deref(), Some("So What"));
}

#[test]
fn grouped_album_listing_carries_artist_forward() {
    let (server, wire) = mock_connection();
    server.respond(
        "list album group albumartist",
        &[
            "AlbumArtist: Miles Davis",
            "Album: Kind of Blue",
            "AlbumArtist: Can",
            "Album: Ege Bamyasi",
            "Album: Future Days",
        ],
    );

    let client = MpdClient::over(wire, test_config()).unwrap();
    let albums = client.albums(None).unwrap();

    assert_eq!(albums.len(), 3);
    let by_name = |name: &str| albums.iter().find(|a| a.name == name).unwrap();
    assert_eq!(by_name("Kind of Blue").artist.as_deref(), Some("Miles Davis"));
    assert_eq!(by_name("Ege Bamyasi").artist.as_deref(), Some("Can"));
    assert_eq!(by_name("Future Days").artist.as_deref(), Some("Can"));
}

#[test]
fn album_art_reassembles_chunked_transfer() {
    let full: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let (server, wire) = mock_connection();
    server.respond_binary("albumart art.jpg 0", full.len(), &full[..2048]);
    server.respond_binary("albumart art.jpg 2048", full.len(), &full[2048..]);

    let client = MpdClient::over(wire, test_config()).unwrap();
    let art = client.album_art("art.jpg").unwrap();

    assert_eq!(art, full);
    // A later command must find the stream aligned after the raw bytes.
    client.ping().unwrap();
    assert_eq!(server.violations(), 0);
}

#[test]
fn watchdog_tears_down_a_silent_connection() {
    let (server, wire) = mock_connection();
    server.stall("status");

    let config = test_config().with_command_timeout(Duration::from_millis(100));
    let client = MpdClient::over(wire, config).unwrap();

    let err = client.status().unwrap_err();
    assert!(matches!(err, ClientError::ConnectionLost(_)), "{err:?}");

    // Without auto-reconnect the client stays down.
    assert!(matches!(
        client.ping().unwrap_err(),
        ClientError::Disconnected
    ));
    assert!(wait_for(Duration::from_secs(1), || {
        client.state() == mpd_client::ConnectionState::Disconnected
    }));
}

#[test]
fn distinct_tag_values_come_back_as_strings() {
    let (server, wire) = mock_connection();
    server.respond("list genre", &["Genre: Jazz", "Genre: Krautrock"]);

    let client = MpdClient::over(wire, test_config()).unwrap();
    let genres = client.list(Tag::Genre, &[]).unwrap();
    assert_eq!(genres, vec!["Jazz", "Krautrock"]);
}

#[test]
fn artists_enumerate_under_either_tag() {
    let (server, wire) = mock_connection();
    server.respond("list artist", &["Artist: Miles Davis", "Artist: Can"]);
    server.respond("list albumartist", &["AlbumArtist: Nina Simone"]);

    let client = MpdClient::over(wire, test_config()).unwrap();

    let artists = client.artists(false).unwrap();
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[0].name, "Miles Davis");
    assert_eq!(artists[1].name, "Can");

    let album_artists = client.artists(true).unwrap();
    assert_eq!(album_artists.len(), 1);
    assert_eq!(album_artists[0].name, "Nina Simone");
}
