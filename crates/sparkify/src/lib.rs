// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Sparkify lake ETL.
//!
//! Song catalog and listening log JSON are read from an input root,
//! reshaped into a star schema (`songplays` facts; `songs`, `artists`,
//! `users`, `time` dimensions) and written as Hive-partitioned Parquet
//! under an output root. Roots are S3 buckets or local directories.

pub mod catalog;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod ids;
pub mod location;
pub mod pipeline;
pub mod provision;
pub mod schema;
pub mod session;
pub mod sink;
pub mod source;

#[cfg(test)]
mod testing;

pub use config::{EtlConfig, SourceConfig, StorageConfig, load_config};
pub use credentials::{AwsCredentials, load_credentials};
pub use error::{ErrorKind, EtlError};
pub use location::Location;
pub use pipeline::{RunSummary, credentials_for, run};
pub use provision::{ProvisionReport, create_bucket};
pub use schema::Table;
pub use sink::TableWrite;

pub type Result<T> = std::result::Result<T, EtlError>;
