// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Argument handling shared by the `etl` and `create-bucket` binaries.

use anyhow::{Context, Result};
use clap::Args;
use sparkify::{AwsCredentials, EtlConfig, load_config, load_credentials};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML configuration; built-in defaults are used when omitted
    #[arg(long, value_name = "YAML")]
    pub config: Option<PathBuf>,

    /// INI file with an [AWS] section; overrides `credentials_file`
    #[arg(long, value_name = "INI")]
    pub credentials: Option<PathBuf>,
}

impl ConfigArgs {
    /// The configuration to run with.
    pub fn load_config(&self) -> Result<EtlConfig> {
        match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display())),
            None => Ok(EtlConfig::default()),
        }
    }

    /// Credentials file path for `config`, honoring `--credentials`.
    #[must_use]
    pub fn credentials_path(&self, config: &EtlConfig) -> PathBuf {
        self.credentials
            .clone()
            .unwrap_or_else(|| config.credentials_file.clone())
    }

    /// Credentials from the selected file, whether or not they are needed.
    pub fn load_credentials(&self, config: &EtlConfig) -> Result<AwsCredentials> {
        let path = self.credentials_path(config);
        load_credentials(&path)
            .with_context(|| format!("Failed to load credentials from {}", path.display()))
    }
}
