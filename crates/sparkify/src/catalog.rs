// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Song catalog to `songs` and `artists`.

use crate::Result;
use crate::location::Location;
use crate::schema::{SONG_DATA_PATTERN, Table, song_schema};
use crate::sink::{TableWrite, write_table};
use crate::source::read_ndjson;
use datafusion::prelude::{DataFrame, SessionContext};
use diagnostics::*;

/// Every song record under `input`.
pub async fn read_songs(ctx: &SessionContext, input: &Location) -> Result<DataFrame> {
    read_ndjson(ctx, input, SONG_DATA_PATTERN, &song_schema()).await
}

/// Distinct `(song_id, title, artist_id, year, duration)` rows.
pub fn songs_table(songs: DataFrame) -> Result<DataFrame> {
    Ok(songs.select_columns(Table::Songs.columns())?.distinct()?)
}

/// Distinct artist rows. An artist with varying attributes across
/// songs yields one row per variant.
pub fn artists_table(songs: DataFrame) -> Result<DataFrame> {
    Ok(songs.select_columns(Table::Artists.columns())?.distinct()?)
}

/// Read the catalog once and write `songs` then `artists`.
pub async fn process_song_data(
    ctx: &SessionContext,
    input: &Location,
    output: &Location,
) -> Result<Vec<TableWrite>> {
    info!("Processing song data from {input}", input: input.as_str());
    let songs = read_songs(ctx, input).await?;

    let mut writes = Vec::with_capacity(2);
    writes.push(write_table(ctx, songs_table(songs.clone())?, Table::Songs, output).await?);
    writes.push(write_table(ctx, artists_table(songs)?, Table::Artists, output).await?);
    Ok(writes)
}
