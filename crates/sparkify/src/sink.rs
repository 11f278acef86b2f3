// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Parquet output for the star schema tables.
//!
//! Each table is a directory `<output_root>/<table>/<table>.parquet/`.
//! Partitioned tables are written Hive-style, e.g.
//! `time/time.parquet/month=11/year=2018/<file>.parquet`, and the
//! partition columns are only present in the directory names.
//!
//! A write replaces the whole table: every object under the table
//! directory is deleted first. There is no locking; two concurrent runs
//! against the same output root will interleave.

use crate::Result;
use crate::location::Location;
use crate::schema::Table;
use arrow::array::AsArray;
use arrow::datatypes::{DataType, UInt64Type};
use datafusion::dataframe::DataFrameWriteOptions;
use datafusion::datasource::listing::ListingTableUrl;
use datafusion::functions::expr_fn::coalesce;
use datafusion::logical_expr::{Expr, cast};
use datafusion::prelude::{DataFrame, SessionContext, col, lit};
use diagnostics::*;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;

/// Directory name used for a null partition value.
pub const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// Outcome of writing one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableWrite {
    pub table: Table,
    pub location: String,
    pub rows: u64,
}

/// Replace `table` under `output` with the rows of `df`.
pub async fn write_table(
    ctx: &SessionContext,
    df: DataFrame,
    table: Table,
    output: &Location,
) -> Result<TableWrite> {
    let url = output.join(&table.relative_path())?;
    let location = url.to_string();

    let removed = clear_prefix(ctx, &location).await?;
    if removed > 0 {
        debug!("Removed {removed} objects from previous run of {table}", removed: removed, table: table.name());
    }

    let partition_by = table.partition_by();
    let df = partition_values_as_strings(df, partition_by)?;
    let options = DataFrameWriteOptions::new()
        .with_partition_by(partition_by.iter().map(|c| (*c).to_string()).collect());

    let result = df.write_parquet(&location, options, None).await?;
    let rows = written_rows(&result);

    info!("Wrote {rows} rows to {table} at {location}", rows: rows, table: table.name(), location: location.as_str());
    Ok(TableWrite {
        table,
        location,
        rows,
    })
}

/// Delete every object below `location`, returning how many went away.
pub async fn clear_prefix(ctx: &SessionContext, location: &str) -> Result<usize> {
    let table_url = ListingTableUrl::parse(location)?;
    let store = ctx.runtime_env().object_store(table_url.object_store())?;
    let prefix = ObjectPath::from(table_url.prefix().as_ref());

    let existing: Vec<ObjectPath> = store
        .list(Some(&prefix))
        .map_ok(|meta| meta.location)
        .try_collect()
        .await?;

    for path in &existing {
        store.delete(path).await?;
    }
    Ok(existing.len())
}

/// Hive directories are strings; convert partition columns up front so
/// the directory value is independent of the column type, and map nulls
/// to [`NULL_PARTITION`].
fn partition_values_as_strings(df: DataFrame, partition_by: &[&str]) -> Result<DataFrame> {
    if partition_by.is_empty() {
        return Ok(df);
    }

    let exprs: Vec<Expr> = df
        .schema()
        .fields()
        .iter()
        .map(|field| {
            let name = field.name();
            if partition_by.contains(&name.as_str()) {
                coalesce(vec![cast(col(name), DataType::Utf8), lit(NULL_PARTITION)]).alias(name)
            } else {
                col(name)
            }
        })
        .collect();

    Ok(df.select(exprs)?)
}

fn written_rows(result: &[arrow::array::RecordBatch]) -> u64 {
    result
        .iter()
        .filter(|batch| batch.num_columns() > 0)
        .filter_map(|batch| batch.column(0).as_primitive_opt::<UInt64Type>())
        .map(|counts| counts.iter().flatten().sum::<u64>())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array, RecordBatch, StringArray};
    use arrow::datatypes::{Field, Schema};
    use datafusion::prelude::ParquetReadOptions;
    use std::sync::Arc;

    fn songs_frame(ctx: &SessionContext) -> DataFrame {
        let schema = Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, true),
            Field::new("title", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("year", DataType::Int64, true),
            Field::new("duration", DataType::Float64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["S1", "S2", "S3"])),
            Arc::new(StringArray::from(vec!["One", "Two", "Three"])),
            Arc::new(StringArray::from(vec![Some("AR1"), Some("AR1"), None])),
            Arc::new(Int64Array::from(vec![1971, 0, 1971])),
            Arc::new(arrow::array::Float64Array::from(vec![1.0, 2.0, 3.0])),
        ];
        let batch = RecordBatch::try_new(schema, columns).expect("batch");
        ctx.read_batch(batch).expect("frame")
    }

    fn files_under(root: &std::path::Path) -> Vec<String> {
        let mut found = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir).expect("read_dir") {
                let path = entry.expect("entry").path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let rel = path.strip_prefix(root).expect("relative");
                    found.push(rel.to_string_lossy().to_string());
                }
            }
        }
        found.sort();
        found
    }

    #[test]
    fn test_written_rows() {
        let schema = Arc::new(Schema::new(vec![Field::new("count", DataType::UInt64, false)]));
        let counts: ArrayRef = Arc::new(arrow::array::UInt64Array::from(vec![3, 4]));
        let batch = RecordBatch::try_new(schema, vec![counts]).expect("batch");
        assert_eq!(written_rows(&[batch]), 7);
        assert_eq!(written_rows(&[]), 0);
    }

    #[tokio::test]
    async fn test_partitioned_write_layout() -> Result<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = Location::parse(&dir.path().to_string_lossy())?;
        let ctx = SessionContext::new();

        let write = write_table(&ctx, songs_frame(&ctx), Table::Songs, &output).await?;
        assert_eq!(write.rows, 3);
        assert!(write.location.ends_with("songs/songs.parquet/"));

        let files = files_under(&dir.path().join("songs/songs.parquet"));
        assert!(files.iter().all(|f| f.ends_with(".parquet")), "{files:?}");
        assert!(files.iter().any(|f| f.starts_with("year=1971/artist_id=AR1/")), "{files:?}");
        assert!(files.iter().any(|f| f.starts_with("year=0/artist_id=AR1/")), "{files:?}");
        assert!(
            files
                .iter()
                .any(|f| f.starts_with(&format!("year=1971/artist_id={NULL_PARTITION}/"))),
            "{files:?}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_partition_columns_not_stored_in_files() -> Result<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = Location::parse(&dir.path().to_string_lossy())?;
        let ctx = SessionContext::new();
        let write = write_table(&ctx, songs_frame(&ctx), Table::Songs, &output).await?;

        let without_partitions = ctx
            .read_parquet(write.location.as_str(), ParquetReadOptions::default())
            .await?;
        let names: Vec<String> = without_partitions
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["song_id", "title", "duration"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_rewrite_replaces_previous_output() -> Result<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = Location::parse(&dir.path().to_string_lossy())?;
        let ctx = SessionContext::new();

        write_table(&ctx, songs_frame(&ctx), Table::Artists, &output).await?;
        let first = files_under(&dir.path().join("artists/artists.parquet"));
        write_table(&ctx, songs_frame(&ctx), Table::Artists, &output).await?;
        let second = files_under(&dir.path().join("artists/artists.parquet"));

        assert!(!first.is_empty());
        assert_eq!(first.len(), second.len());

        let location = output.join(&Table::Artists.relative_path())?.to_string();
        let rows = ctx
            .read_parquet(location.as_str(), ParquetReadOptions::default())
            .await?
            .count()
            .await?;
        assert_eq!(rows, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_missing_prefix() -> Result<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = Location::parse(&dir.path().to_string_lossy())?;
        let ctx = SessionContext::new();
        let location = output.join("nothing/here/")?.to_string();
        assert_eq!(clear_prefix(&ctx, &location).await?, 0);
        Ok(())
    }
}
