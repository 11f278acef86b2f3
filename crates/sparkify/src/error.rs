// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the ETL job and the bucket provisioner

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`EtlError`].
///
/// Setup failures (`Config`) and storage failures (`Storage`) mean the
/// run never touched the data; `Data` means the engine rejected or
/// could not process the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Storage,
    Data,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Config => "config",
            ErrorKind::Storage => "storage",
            ErrorKind::Data => "data",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML configuration: {0}")]
    ConfigParse(#[from] serde_yaml_ng::Error),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Failed to load credentials file: {0}")]
    CredentialsFile(#[from] ini::Error),

    #[error("Invalid location {location}: {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("S3 error: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("{operation} failed for {target}: HTTP {status}: {body}")]
    Provision {
        operation: String,
        target: String,
        status: u16,
        body: String,
    },

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("No input files under {location} match {pattern}")]
    NoInputFiles { location: String, pattern: String },

    #[error("Invalid file pattern: {0}")]
    Pattern(String),
}

impl EtlError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            EtlError::Config(_)
            | EtlError::ConfigFile { .. }
            | EtlError::ConfigParse(_)
            | EtlError::Credentials(_)
            | EtlError::CredentialsFile(_)
            | EtlError::InvalidLocation { .. } => ErrorKind::Config,
            EtlError::ObjectStore(_) | EtlError::S3(_) | EtlError::Provision { .. } => {
                ErrorKind::Storage
            }
            EtlError::DataFusion(err) => match err.find_root() {
                datafusion::error::DataFusionError::ObjectStore(_) => ErrorKind::Storage,
                _ => ErrorKind::Data,
            },
            EtlError::Arrow(_) | EtlError::NoInputFiles { .. } | EtlError::Pattern(_) => {
                ErrorKind::Data
            }
        }
    }
}
