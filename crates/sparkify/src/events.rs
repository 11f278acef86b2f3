// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Listening logs to `users`, `time` and `songplays`.
//!
//! Only `NextSong` records take part. The play timestamp `ts` is epoch
//! milliseconds; `start_time` keeps whole seconds, so two plays within
//! the same second share a `time` row.

use crate::Result;
use crate::catalog::read_songs;
use crate::ids::assign_monotonic_ids;
use crate::location::Location;
use crate::schema::{LOG_DATA_PATTERN, NEXT_SONG_PAGE, Table, log_schema};
use crate::sink::{TableWrite, write_table};
use crate::source::read_ndjson;
use arrow::datatypes::{DataType, TimeUnit};
use datafusion::common::JoinType;
use datafusion::functions::expr_fn::{date_part, to_char, to_timestamp_seconds};
use datafusion::logical_expr::{Expr, cast};
use datafusion::prelude::{DataFrame, SessionContext, col, lit};
use diagnostics::*;

/// Join keys, log side then catalog side.
const EVENT_KEYS: [&str; 3] = ["song", "artist", "length"];
const SONG_KEYS: [&str; 3] = ["title", "artist_name", "duration"];

/// Every log record under `input`.
pub async fn read_logs(ctx: &SessionContext, input: &Location) -> Result<DataFrame> {
    read_ndjson(ctx, input, LOG_DATA_PATTERN, &log_schema()).await
}

/// Song plays only: `page == "NextSong"`, compared exactly.
pub fn play_events(logs: DataFrame) -> Result<DataFrame> {
    Ok(logs.filter(col("page").eq(lit(NEXT_SONG_PAGE)))?)
}

/// Distinct `(userId, firstName, lastName, gender, level)` rows.
///
/// A user who changed level shows up once per level.
pub fn users_table(events: DataFrame) -> Result<DataFrame> {
    Ok(events.select_columns(Table::Users.columns())?.distinct()?)
}

/// Add `start_time`, the UTC play time truncated to whole seconds.
pub fn with_start_time(events: DataFrame) -> Result<DataFrame> {
    let seconds = to_timestamp_seconds(vec![col("ts") / lit(1000_i64)]);
    let start_time = cast(seconds, DataType::Timestamp(TimeUnit::Millisecond, None));
    Ok(events.with_column("start_time", start_time)?)
}

/// One row per distinct `start_time` with its calendar breakdown.
pub fn time_table(events: DataFrame) -> Result<DataFrame> {
    let start_time = col("start_time");
    Ok(events
        .select(vec![
            start_time.clone(),
            time_part("hour", &start_time),
            time_part("day", &start_time),
            time_part("week", &start_time),
            time_part("month", &start_time),
            time_part("year", &start_time),
            to_char(start_time.clone(), lit("%a")).alias("weekday"),
        ])?
        .distinct()?)
}

/// Inner join of plays to catalog songs on title, artist name and
/// duration. Equality is exact, so 210.5 and 210.501 do not match and a
/// null key never matches.
pub fn join_songs(events: DataFrame, songs: DataFrame) -> Result<DataFrame> {
    let songs = songs.select_columns(&["song_id", "title", "artist_id", "artist_name", "duration"])?;
    Ok(events.join(songs, JoinType::Inner, &EVENT_KEYS, &SONG_KEYS, None)?)
}

/// Distinct joined plays in the songplays shape, numbered with
/// `songplay_id`. `year` and `month` come from the row's own
/// `start_time`.
pub async fn songplays_table(ctx: &SessionContext, joined: DataFrame) -> Result<DataFrame> {
    let start_time = col("start_time");
    let shaped = joined.distinct()?.select(vec![
        col("userId").alias("user_id"),
        start_time.clone(),
        col("song_id"),
        col("artist_id"),
        col("level"),
        col("sessionId").alias("session_id"),
        col("location"),
        col("userAgent").alias("user_agent"),
        time_part("year", &start_time),
        time_part("month", &start_time),
    ])?;
    assign_monotonic_ids(ctx, shaped, "songplay_id").await
}

/// Write `users`, `time` and `songplays`. The catalog is read again
/// from `input` for the join.
pub async fn process_log_data(
    ctx: &SessionContext,
    input: &Location,
    output: &Location,
) -> Result<Vec<TableWrite>> {
    info!("Processing log data from {input}", input: input.as_str());
    let plays = play_events(read_logs(ctx, input).await?)?;

    let mut writes = Vec::with_capacity(3);
    writes.push(write_table(ctx, users_table(plays.clone())?, Table::Users, output).await?);

    let plays = with_start_time(plays)?;
    writes.push(write_table(ctx, time_table(plays.clone())?, Table::Time, output).await?);

    let songs = read_songs(ctx, input).await?;
    let songplays = songplays_table(ctx, join_songs(plays, songs)?).await?;
    writes.push(write_table(ctx, songplays, Table::Songplays, output).await?);
    Ok(writes)
}

fn time_part(part: &str, timestamp: &Expr) -> Expr {
    cast(date_part(lit(part), timestamp.clone()), DataType::Int32).alias(part)
}
