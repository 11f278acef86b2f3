// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Synthetic row ids.
//!
//! Row `r` (0-based) of output partition `p` gets `(p << 33) + r`. The
//! guarantee is narrow on purpose:
//! - ids are unique within one run
//! - ids increase along the rows of one partition
//!
//! Ids are not contiguous (every partition starts a new 2^33 block), not
//! globally ordered, and not stable across runs, since the engine is
//! free to split the input differently each time.

use crate::Result;
use arrow::array::{ArrayRef, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use datafusion::datasource::MemTable;
use datafusion::physical_plan::collect_partitioned;
use datafusion::prelude::{DataFrame, SessionContext};
use diagnostics::*;
use std::sync::Arc;

/// Bits reserved for the row number inside one partition.
pub const ROW_BITS: u32 = 33;

/// First id handed out in `partition`.
#[must_use]
pub fn partition_base(partition: usize) -> i64 {
    (partition as i64) << ROW_BITS
}

/// Execute `df` and prepend a non-null `Int64` column `column` holding
/// a monotonically increasing id. The result is an in-memory frame with
/// the same partitioning the engine produced.
pub async fn assign_monotonic_ids(
    ctx: &SessionContext,
    df: DataFrame,
    column: &str,
) -> Result<DataFrame> {
    let task_ctx = Arc::new(df.task_ctx());
    let plan = df.create_physical_plan().await?;
    let input_schema = plan.schema();
    let partitions = collect_partitioned(plan, task_ctx).await?;

    let schema = with_id_field(&input_schema, column);
    let mut numbered = Vec::with_capacity(partitions.len());
    for (partition, batches) in partitions.into_iter().enumerate() {
        numbered.push(number_partition(&schema, partition, batches)?);
    }

    let count = numbered.len();
    debug!("Assigned {column} across {count} partitions", column: column, count: count);

    let table = MemTable::try_new(schema, numbered)?;
    Ok(ctx.read_table(Arc::new(table))?)
}

fn with_id_field(input: &Schema, column: &str) -> SchemaRef {
    let mut fields = vec![Arc::new(Field::new(column, DataType::Int64, false))];
    fields.extend(input.fields().iter().cloned());
    Arc::new(Schema::new(fields))
}

fn number_partition(
    schema: &SchemaRef,
    partition: usize,
    batches: Vec<RecordBatch>,
) -> Result<Vec<RecordBatch>> {
    let mut next = partition_base(partition);
    let mut out = Vec::with_capacity(batches.len());
    for batch in batches {
        let rows = batch.num_rows() as i64;
        let ids: ArrayRef = Arc::new(Int64Array::from_iter_values(next..next + rows));
        next += rows;

        let mut columns = Vec::with_capacity(batch.num_columns() + 1);
        columns.push(ids);
        columns.extend(batch.columns().iter().cloned());
        out.push(RecordBatch::try_new(Arc::clone(schema), columns)?);
    }
    Ok(out)
}
