// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Destination bucket provisioning.
//!
//! Creates the bucket (private, in the configured region) and then one
//! zero-byte `<folder>/` marker per configured folder. Nothing is
//! checked beforehand: an existing bucket fails the create call, and
//! the first failure stops the sequence.

use crate::Result;
use crate::config::{StorageConfig, validate_storage};
use crate::credentials::AwsCredentials;
use crate::error::EtlError;
use diagnostics::*;
use s3::bucket::Bucket;
use s3::bucket_ops::BucketConfiguration;
use s3::creds::Credentials;
use s3::region::Region;

/// The two storage calls provisioning needs.
pub trait BucketClient {
    fn create_bucket(&self, bucket: &str) -> Result<()>;

    fn put_folder(&self, bucket: &str, key: &str) -> Result<()>;
}

/// What was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub bucket: String,
    pub folders: Vec<String>,
}

/// Object key of the marker for `folder`.
#[must_use]
pub fn folder_key(folder: &str) -> String {
    format!("{}/", folder.trim_matches('/'))
}

/// Create the bucket, then the folder markers in configured order.
pub fn provision<C: BucketClient + ?Sized>(
    client: &C,
    storage: &StorageConfig,
) -> Result<ProvisionReport> {
    validate_storage(storage)?;

    let bucket = storage.bucket.as_str();
    client.create_bucket(bucket)?;
    info!("Created bucket {bucket} in {region}", bucket: bucket, region: storage.region.as_str());

    let mut folders = Vec::with_capacity(storage.folders.len());
    for folder in &storage.folders {
        let key = folder_key(folder);
        client.put_folder(bucket, &key)?;
        debug!("Created folder marker {key} in {bucket}", key: key.as_str(), bucket: bucket);
        folders.push(key);
    }

    Ok(ProvisionReport {
        bucket: bucket.to_string(),
        folders,
    })
}

/// Blocking S3 implementation of [`BucketClient`].
pub struct S3BucketClient {
    region: Region,
    credentials: Credentials,
    path_style: bool,
}

impl S3BucketClient {
    /// Client for the region (and optional endpoint) in `storage`.
    pub fn new(storage: &StorageConfig, credentials: &AwsCredentials) -> Result<Self> {
        let region = match &storage.endpoint {
            Some(endpoint) => Region::Custom {
                region: storage.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => storage.region.parse::<Region>().map_err(|e| {
                EtlError::Config(format!("invalid region {}: {e}", storage.region))
            })?,
        };

        let credentials = Credentials::new(
            Some(credentials.access_key_id.as_str()),
            Some(credentials.secret_access_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| EtlError::Credentials(e.to_string()))?;

        Ok(Self {
            region,
            credentials,
            path_style: storage.endpoint.is_some(),
        })
    }
}

impl BucketClient for S3BucketClient {
    fn create_bucket(&self, bucket: &str) -> Result<()> {
        let config = BucketConfiguration::private();
        let response = if self.path_style {
            Bucket::create_with_path_style(
                bucket,
                self.region.clone(),
                self.credentials.clone(),
                config,
            )?
        } else {
            Bucket::create(bucket, self.region.clone(), self.credentials.clone(), config)?
        };

        if !response.success() {
            return Err(EtlError::Provision {
                operation: "create bucket".to_string(),
                target: bucket.to_string(),
                status: response.response_code,
                body: response.response_text,
            });
        }
        Ok(())
    }

    fn put_folder(&self, bucket: &str, key: &str) -> Result<()> {
        let target = Bucket::new(bucket, self.region.clone(), self.credentials.clone())?;
        let target = if self.path_style {
            target.with_path_style()
        } else {
            target
        };
        let response = target.put_object(key, &[])?;
        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(EtlError::Provision {
                operation: "put folder".to_string(),
                target: format!("{bucket}/{key}"),
                status,
                body: String::from_utf8_lossy(response.as_slice()).to_string(),
            });
        }
        Ok(())
    }
}

/// Provision the configured bucket on S3.
pub fn create_bucket(storage: &StorageConfig, credentials: &AwsCredentials) -> Result<ProvisionReport> {
    let client = S3BucketClient::new(storage, credentials)?;
    provision(&client, storage)
}
