// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use sparkify::EtlConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 2018-11-15T00:41:21.796Z, a Thursday.
pub const TS_NOV: i64 = 1_542_242_481_796;
/// 2018-12-01T00:01:01Z
pub const TS_DEC: i64 = 1_543_622_461_000;

/// Input and output directories for one test, removed on drop.
pub struct Lake {
    pub input: TempDir,
    pub output: TempDir,
}

impl Lake {
    pub fn new() -> Self {
        Self {
            input: tempfile::tempdir().expect("input dir"),
            output: tempfile::tempdir().expect("output dir"),
        }
    }

    pub fn config(&self) -> EtlConfig {
        EtlConfig::with_roots(
            self.input.path().to_string_lossy(),
            self.output.path().to_string_lossy(),
        )
    }

    pub fn table_dir(&self, table: sparkify::Table) -> PathBuf {
        let name = table.name();
        self.output.path().join(name).join(format!("{name}.parquet"))
    }

    pub fn table_url(&self, table: sparkify::Table) -> String {
        format!("{}/", self.table_dir(table).display())
    }

    pub fn write_songs(&self, rel: &str, songs: &[Song<'_>]) {
        let lines: Vec<String> = songs.iter().map(Song::to_json).collect();
        write_lines(self.input.path(), rel, &lines);
    }

    pub fn write_events(&self, rel: &str, events: &[Event<'_>]) {
        let lines: Vec<String> = events.iter().map(Event::to_json).collect();
        write_lines(self.input.path(), rel, &lines);
    }
}

pub struct Song<'a> {
    pub song_id: &'a str,
    pub title: &'a str,
    pub artist_id: &'a str,
    pub artist_name: &'a str,
    pub duration: f64,
    pub year: i64,
}

impl Song<'_> {
    pub fn to_json(&self) -> String {
        let Song {
            song_id,
            title,
            artist_id,
            artist_name,
            duration,
            year,
        } = self;
        format!(
            r#"{{"num_songs": 1, "artist_id": "{artist_id}", "artist_latitude": 40.7, "artist_longitude": -74.0, "artist_location": "New York", "artist_name": "{artist_name}", "song_id": "{song_id}", "title": "{title}", "duration": {duration:?}, "year": {year}}}"#
        )
    }
}

pub struct Event<'a> {
    pub page: &'a str,
    pub user_id: &'a str,
    pub first_name: &'a str,
    pub level: &'a str,
    pub song: &'a str,
    pub artist: &'a str,
    pub length: f64,
    pub session_id: i64,
    pub ts: i64,
}

impl<'a> Event<'a> {
    pub fn play(user_id: &'a str, song: &'a str, artist: &'a str, length: f64, ts: i64) -> Self {
        Self {
            page: "NextSong",
            user_id,
            first_name: "Kaylee",
            level: "free",
            song,
            artist,
            length,
            session_id: 139,
            ts,
        }
    }

    pub fn to_json(&self) -> String {
        let Event {
            page,
            user_id,
            first_name,
            level,
            song,
            artist,
            length,
            session_id,
            ts,
        } = self;
        format!(
            r#"{{"artist": "{artist}", "auth": "Logged In", "firstName": "{first_name}", "gender": "F", "itemInSession": 0, "lastName": "Summers", "length": {length:?}, "level": "{level}", "location": "Phoenix-Mesa-Scottsdale, AZ", "method": "PUT", "page": "{page}", "registration": 1540344794796.0, "sessionId": {session_id}, "song": "{song}", "status": 200, "ts": {ts}, "userAgent": "Mozilla/5.0 (Windows NT 6.1; WOW64)", "userId": "{user_id}"}}"#
        )
    }
}

pub fn write_lines(root: &Path, rel: &str, lines: &[String]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, lines.join("\n") + "\n").expect("write fixture");
}

/// Every regular file below `root`, relative and sorted.
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                found.push(path.strip_prefix(root).expect("relative").to_path_buf());
            }
        }
    }
    found.sort();
    found
}
