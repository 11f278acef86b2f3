// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Session factory: one DataFusion `SessionContext` per run, with an
//! S3 object store registered for every bucket the run touches.

use crate::Result;
use crate::config::EtlConfig;
use crate::credentials::AwsCredentials;
use crate::error::EtlError;
use datafusion::prelude::{SessionConfig, SessionContext};
use diagnostics::*;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

/// One S3 bucket to register, with the region it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Target {
    pub store_url: Url,
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
}

/// The S3 buckets behind the input and output roots, one per
/// `scheme://bucket`.
///
/// The output bucket uses `storage` settings and the input bucket uses
/// `input` settings. When both roots share a bucket the output settings
/// win, since that bucket is the one the provisioner created.
pub fn s3_targets(config: &EtlConfig) -> Result<Vec<S3Target>> {
    let input = config.input()?;
    let output = config.output()?;

    let mut targets: BTreeMap<String, S3Target> = BTreeMap::new();
    let sides = [
        (&input, &config.input.region, &config.input.endpoint),
        (&output, &config.storage.region, &config.storage.endpoint),
    ];
    for (location, region, endpoint) in sides {
        if let (Some(store_url), Some(bucket)) = (location.store_url(), location.bucket()) {
            targets.insert(
                store_url.to_string(),
                S3Target {
                    store_url,
                    bucket: bucket.to_string(),
                    region: region.clone(),
                    endpoint: endpoint.clone(),
                },
            );
        }
    }
    Ok(targets.into_values().collect())
}

/// Engine settings for a run.
///
/// Directory scans skip nested non-Hive directories; input discovery
/// relies on this when it hands whole directories to the JSON reader.
#[must_use]
pub fn session_config() -> SessionConfig {
    let mut config = SessionConfig::new();
    config.options_mut().execution.listing_table_ignore_subdirectory = true;
    config
}

/// Build the session for one run.
///
/// `credentials` is required as soon as the input or output root is an
/// S3 location. Local roots use the engine's built-in filesystem store.
pub fn create_session(
    config: &EtlConfig,
    credentials: Option<&AwsCredentials>,
) -> Result<SessionContext> {
    let targets = s3_targets(config)?;
    let ctx = SessionContext::new_with_config(session_config());

    if targets.is_empty() {
        debug!("No S3 locations, using local filesystem only");
        return Ok(ctx);
    }

    let credentials = credentials.ok_or_else(|| {
        EtlError::Credentials(format!(
            "S3 locations configured ({}) but no credentials were provided",
            targets
                .iter()
                .map(|t| t.store_url.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;

    for target in &targets {
        let store = s3_builder(target, credentials).build()?;
        let _ = ctx.register_object_store(&target.store_url, Arc::new(store));
        debug!(
            "Registered S3 object store {url} in {region}",
            url: target.store_url.as_str(),
            region: target.region.as_str()
        );
    }

    let count = targets.len();
    info!("Session ready with {count} S3 object stores", count: count);
    Ok(ctx)
}

/// S3 client settings for `target`, authenticated with explicit credentials.
#[must_use]
pub fn s3_builder(target: &S3Target, credentials: &AwsCredentials) -> AmazonS3Builder {
    let builder = AmazonS3Builder::new()
        .with_bucket_name(&target.bucket)
        .with_region(&target.region)
        .with_access_key_id(&credentials.access_key_id)
        .with_secret_access_key(&credentials.secret_access_key);

    match &target.endpoint {
        Some(endpoint) => builder
            .with_endpoint(endpoint)
            .with_virtual_hosted_style_request(false)
            .with_allow_http(endpoint.starts_with("http://")),
        None => builder,
    }
}

/// Build the S3 store for `target`.
pub fn build_s3_store(target: &S3Target, credentials: &AwsCredentials) -> Result<AmazonS3> {
    Ok(s3_builder(target, credentials).build()?)
}
