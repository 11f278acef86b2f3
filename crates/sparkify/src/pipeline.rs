// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! One full ETL run: catalog tables first, then the event tables.

use crate::Result;
use crate::catalog::process_song_data;
use crate::config::{EtlConfig, validate_config};
use crate::credentials::{AwsCredentials, load_credentials};
use crate::events::process_log_data;
use crate::schema::Table;
use crate::session::create_session;
use crate::sink::TableWrite;
use diagnostics::*;
use std::path::Path;
use std::time::{Duration, Instant};

/// What a run wrote, in write order.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub tables: Vec<TableWrite>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Rows written to `table`, if it was written.
    #[must_use]
    pub fn rows(&self, table: Table) -> Option<u64> {
        self.tables
            .iter()
            .find(|write| write.table == table)
            .map(|write| write.rows)
    }
}

/// Credentials for `config`: `None` when every root is local. An
/// explicit `path` overrides the configured credentials file.
pub fn credentials_for(config: &EtlConfig, path: Option<&Path>) -> Result<Option<AwsCredentials>> {
    if !config.needs_credentials()? {
        return Ok(None);
    }
    let path = path.unwrap_or(config.credentials_file.as_path());
    debug!("Loading credentials from {path}", path: path.display().to_string());
    Ok(Some(load_credentials(path)?))
}

/// Validate, build the session, then run both transforms in order.
/// The first error stops the run; tables written before it stay.
pub async fn run(config: &EtlConfig, credentials: Option<AwsCredentials>) -> Result<RunSummary> {
    let started = Instant::now();
    validate_config(config)?;

    let input = config.input()?;
    let output = config.output()?;
    let ctx = create_session(config, credentials.as_ref())?;
    info!("Starting ETL from {input} to {output}", input: input.as_str(), output: output.as_str());

    let mut tables = process_song_data(&ctx, &input, &output).await?;
    tables.extend(process_log_data(&ctx, &input, &output).await?);

    let elapsed = started.elapsed();
    let count = tables.len();
    let seconds = elapsed.as_secs_f64();
    info!("ETL finished: {count} tables in {seconds}s", count: count, seconds: seconds);
    Ok(RunSummary { tables, elapsed })
}
