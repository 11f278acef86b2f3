// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::Parser;
use cmd::ConfigArgs;
use diagnostics::*;

/// Build the Sparkify star schema from raw song and log data
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "etl")]
struct Cli {
    #[command(flatten)]
    args: ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_diagnostics();

    let cli = Cli::parse();
    let config = cli.args.load_config()?;

    let credentials = sparkify::credentials_for(&config, cli.args.credentials.as_deref())
        .context("Failed to load AWS credentials")?;

    let summary = sparkify::run(&config, credentials)
        .await
        .context("ETL run failed")?;

    for write in &summary.tables {
        let table = write.table.name();
        let rows = write.rows;
        info!("{table}: {rows} rows at {location}", table: table, rows: rows, location: write.location.as_str());
    }
    Ok(())
}
