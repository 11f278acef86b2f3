// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Raw record schemas and output table layout.

use arrow::datatypes::{DataType, Field, Schema};

/// Glob for song catalog files: `song_data/<A>/<B>/<C>/<track>.json`
pub const SONG_DATA_PATTERN: &str = "song_data/*/*/*/*.json";

/// Glob for listening logs: `log_data/<year>/<month>/<day>-events.json`
pub const LOG_DATA_PATTERN: &str = "log_data/*/*/*.json";

/// The `page` value marking a song play.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// Schema for one line of a song catalog file.
#[must_use]
pub fn song_schema() -> Schema {
    Schema::new(vec![
        Field::new("num_songs", DataType::Int64, true),
        Field::new("artist_id", DataType::Utf8, true),
        Field::new("artist_latitude", DataType::Float64, true),
        Field::new("artist_longitude", DataType::Float64, true),
        Field::new("artist_location", DataType::Utf8, true),
        Field::new("artist_name", DataType::Utf8, true),
        Field::new("song_id", DataType::Utf8, true),
        Field::new("title", DataType::Utf8, true),
        Field::new("duration", DataType::Float64, true),
        Field::new("year", DataType::Int64, true),
    ])
}

/// Schema for one line of a listening log file. `ts` is epoch millis.
#[must_use]
pub fn log_schema() -> Schema {
    Schema::new(vec![
        Field::new("artist", DataType::Utf8, true),
        Field::new("auth", DataType::Utf8, true),
        Field::new("firstName", DataType::Utf8, true),
        Field::new("gender", DataType::Utf8, true),
        Field::new("itemInSession", DataType::Int64, true),
        Field::new("lastName", DataType::Utf8, true),
        Field::new("length", DataType::Float64, true),
        Field::new("level", DataType::Utf8, true),
        Field::new("location", DataType::Utf8, true),
        Field::new("method", DataType::Utf8, true),
        Field::new("page", DataType::Utf8, true),
        Field::new("registration", DataType::Float64, true),
        Field::new("sessionId", DataType::Int64, true),
        Field::new("song", DataType::Utf8, true),
        Field::new("status", DataType::Int64, true),
        Field::new("ts", DataType::Int64, true),
        Field::new("userAgent", DataType::Utf8, true),
        Field::new("userId", DataType::Utf8, true),
    ])
}

/// Output tables of the star schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Songs,
    Artists,
    Users,
    Time,
    Songplays,
}

impl Table {
    /// Write order of a full run.
    pub const ALL: [Table; 5] = [
        Table::Songs,
        Table::Artists,
        Table::Users,
        Table::Time,
        Table::Songplays,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Table::Songs => "songs",
            Table::Artists => "artists",
            Table::Users => "users",
            Table::Time => "time",
            Table::Songplays => "songplays",
        }
    }

    #[must_use]
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Songs => &["song_id", "title", "artist_id", "year", "duration"],
            Table::Artists => &[
                "artist_id",
                "artist_name",
                "artist_location",
                "artist_latitude",
                "artist_longitude",
            ],
            Table::Users => &["userId", "firstName", "lastName", "gender", "level"],
            Table::Time => &[
                "start_time",
                "hour",
                "day",
                "week",
                "month",
                "year",
                "weekday",
            ],
            Table::Songplays => &[
                "songplay_id",
                "user_id",
                "start_time",
                "song_id",
                "artist_id",
                "level",
                "session_id",
                "location",
                "user_agent",
                "year",
                "month",
            ],
        }
    }

    /// Hive partition columns, outermost directory first.
    #[must_use]
    pub fn partition_by(self) -> &'static [&'static str] {
        match self {
            Table::Songs => &["year", "artist_id"],
            Table::Time | Table::Songplays => &["month", "year"],
            Table::Artists | Table::Users => &[],
        }
    }

    /// Directory under the output root, e.g. `songs/songs.parquet/`.
    #[must_use]
    pub fn relative_path(self) -> String {
        format!("{0}/{0}.parquet/", self.name())
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
