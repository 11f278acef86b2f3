// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Fixture helpers shared by the unit tests.

use crate::location::Location;
use std::path::Path;

/// Input root for a local fixture directory.
pub fn fixture_root(dir: &Path) -> Location {
    Location::parse(&dir.to_string_lossy()).expect("fixture root")
}

/// Write `lines` as one JSON-lines file at `root/rel`.
pub fn write_lines(root: &Path, rel: &str, lines: &[String]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, lines.join("\n") + "\n").expect("write fixture");
}

/// One song catalog record.
pub fn song_line(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    duration: f64,
    year: i64,
) -> String {
    format!(
        r#"{{"num_songs": 1, "artist_id": "{artist_id}", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "{artist_name}", "song_id": "{song_id}", "title": "{title}", "duration": {duration:?}, "year": {year}}}"#
    )
}

/// Fields of a log record that tests vary.
#[derive(Debug, Clone)]
pub struct PlayEvent {
    pub page: &'static str,
    pub user_id: &'static str,
    pub level: &'static str,
    pub song: &'static str,
    pub artist: &'static str,
    pub length: f64,
    pub ts: i64,
}

impl PlayEvent {
    pub fn next_song(
        user_id: &'static str,
        song: &'static str,
        artist: &'static str,
        length: f64,
        ts: i64,
    ) -> Self {
        Self {
            page: "NextSong",
            user_id,
            level: "free",
            song,
            artist,
            length,
            ts,
        }
    }
}

/// One listening log record.
pub fn log_line(event: &PlayEvent) -> String {
    let PlayEvent {
        page,
        user_id,
        level,
        song,
        artist,
        length,
        ts,
    } = event;
    format!(
        r#"{{"artist": "{artist}", "auth": "Logged In", "firstName": "Ann", "gender": "F", "itemInSession": 0, "lastName": "Lee", "length": {length:?}, "level": "{level}", "location": "Portland, OR", "method": "PUT", "page": "{page}", "registration": 1540919166796.0, "sessionId": 583, "song": "{song}", "status": 200, "ts": {ts}, "userAgent": "Mozilla/5.0", "userId": "{user_id}"}}"#
    )
}
