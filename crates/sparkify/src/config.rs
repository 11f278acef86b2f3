// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Job configuration.
//!
//! Every field has a default, so running with no configuration file
//! reads the public song/log dataset and writes to the project bucket.
//! A YAML file can override any subset of fields:
//!
//! ```yaml
//! input_root: s3a://udacity-dend/
//! output_root: s3a://janneman-udacity-sparkify-data-lake/
//! credentials_file: dl.cfg
//! input:
//!   region: us-west-2
//! storage:
//!   bucket: janneman-udacity-sparkify-data-lake
//!   region: us-west-2
//!   folders: [songs, songplays, time, artists, users]
//! ```

use crate::Result;
use crate::error::EtlError;
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_ROOT: &str = "s3a://udacity-dend/";
pub const DEFAULT_OUTPUT_ROOT: &str = "s3a://janneman-udacity-sparkify-data-lake/";
pub const DEFAULT_CREDENTIALS_FILE: &str = "dl.cfg";
pub const DEFAULT_BUCKET: &str = "janneman-udacity-sparkify-data-lake";
pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_INPUT_REGION: &str = "us-west-2";
pub const DEFAULT_FOLDERS: [&str; 5] = ["songs", "songplays", "time", "artists", "users"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    /// Root holding `song_data/` and `log_data/`
    pub input_root: String,
    /// Root receiving one folder per output table
    pub output_root: String,
    /// INI file with the `[AWS]` section
    pub credentials_file: PathBuf,
    /// Where the input bucket lives; it is usually not the destination
    /// bucket's region
    pub input: SourceConfig,
    pub storage: StorageConfig,
}

/// Input bucket settings. S3 does not redirect a client across
/// regions, so the input bucket needs its own region.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub region: String,
    /// S3-compatible endpoint, e.g. `http://localhost:9000`
    pub endpoint: Option<String>,
}

/// Destination bucket settings, shared by the provisioner and the S3
/// object stores the session registers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// S3-compatible endpoint, e.g. `http://localhost:9000`
    pub endpoint: Option<String>,
    /// Folder markers created under the bucket, in creation order
    pub folders: Vec<String>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input_root: DEFAULT_INPUT_ROOT.to_string(),
            output_root: DEFAULT_OUTPUT_ROOT.to_string(),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            input: SourceConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_INPUT_REGION.to_string(),
            endpoint: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            folders: DEFAULT_FOLDERS.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

impl EtlConfig {
    /// Config for a job between two roots, everything else defaulted.
    #[must_use]
    pub fn with_roots(input_root: impl Into<String>, output_root: impl Into<String>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    pub fn input(&self) -> Result<Location> {
        Location::parse(&self.input_root)
    }

    pub fn output(&self) -> Result<Location> {
        Location::parse(&self.output_root)
    }

    /// True when either root lives in S3.
    pub fn needs_credentials(&self) -> Result<bool> {
        Ok(self.input()?.is_s3() || self.output()?.is_s3())
    }
}

/// Load and validate a YAML configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EtlConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| EtlError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate YAML configuration text.
pub fn parse_config(content: &str) -> Result<EtlConfig> {
    let config: EtlConfig = serde_yaml_ng::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &EtlConfig) -> Result<()> {
    let _ = config.input()?;
    let _ = config.output()?;
    validate_region("input", &config.input.region, config.input.endpoint.as_deref())?;
    validate_storage(&config.storage)
}

pub fn validate_storage(storage: &StorageConfig) -> Result<()> {
    validate_bucket_name(&storage.bucket)?;
    validate_region("storage", &storage.region, storage.endpoint.as_deref())?;

    if storage.folders.is_empty() {
        return Err(EtlError::Config(
            "storage.folders must name at least one folder".into(),
        ));
    }

    let mut seen = HashSet::new();
    for folder in &storage.folders {
        if folder.is_empty() || folder.contains('/') {
            return Err(EtlError::Config(format!(
                "storage.folders entry '{folder}' must be a single non-empty path segment"
            )));
        }
        if !seen.insert(folder.as_str()) {
            return Err(EtlError::Config(format!(
                "storage.folders lists '{folder}' twice"
            )));
        }
    }

    Ok(())
}

fn validate_region(section: &str, region: &str, endpoint: Option<&str>) -> Result<()> {
    if region.trim().is_empty() {
        return Err(EtlError::Config(format!("{section}.region cannot be empty")));
    }

    if let Some(endpoint) = endpoint {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(EtlError::Config(format!(
                "{section}.endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
    }
    Ok(())
}

fn validate_bucket_name(bucket: &str) -> Result<()> {
    let valid_chars = bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    let valid_edges = bucket
        .chars()
        .next()
        .zip(bucket.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    if (3..=63).contains(&bucket.len()) && valid_chars && valid_edges {
        Ok(())
    } else {
        Err(EtlError::Config(format!(
            "storage.bucket '{bucket}' is not a valid S3 bucket name"
        )))
    }
}
