// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::Parser;
use cmd::ConfigArgs;
use diagnostics::*;

/// Create the destination bucket and one folder per output table
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "create-bucket")]
struct Cli {
    #[command(flatten)]
    args: ConfigArgs,
}

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    init_diagnostics();

    let cli = Cli::parse();
    let config = cli.args.load_config()?;
    let credentials = cli.args.load_credentials(&config)?;

    let report = sparkify::create_bucket(&config.storage, &credentials)
        .with_context(|| format!("Failed to provision bucket {}", config.storage.bucket))?;

    let count = report.folders.len();
    info!("Provisioned {bucket} with {count} folders", bucket: report.bucket.as_str(), count: count);
    println!("Folders created");
    Ok(())
}
