// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Root locations for input and output data.
//!
//! A [`Location`] is always a directory-style URL ending in `/`:
//! `s3://bucket/prefix/`, `s3a://bucket/prefix/` or `file:///abs/path/`.
//! Plain filesystem paths are made absolute and turned into `file://`
//! URLs, so the engine never sees a relative path.

use crate::Result;
use crate::error::EtlError;
use std::fmt;
use url::Url;

const S3_SCHEMES: [&str; 2] = ["s3", "s3a"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    pub fn parse(location: &str) -> Result<Self> {
        let invalid = |reason: &str| EtlError::InvalidLocation {
            location: location.to_string(),
            reason: reason.to_string(),
        };

        if location.trim().is_empty() {
            return Err(invalid("location is empty"));
        }

        let mut url = if location.contains("://") {
            Url::parse(location).map_err(|e| invalid(&e.to_string()))?
        } else {
            let absolute = std::path::absolute(location).map_err(|e| invalid(&e.to_string()))?;
            Url::from_directory_path(&absolute)
                .map_err(|()| invalid("path cannot be expressed as a file URL"))?
        };

        match url.scheme() {
            "file" => {}
            scheme if S3_SCHEMES.contains(&scheme) => {
                if url.host_str().is_none_or(str::is_empty) {
                    return Err(invalid("S3 location has no bucket"));
                }
            }
            scheme => {
                return Err(invalid(&format!(
                    "unsupported scheme '{scheme}', expected s3, s3a or file"
                )));
            }
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { url })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    #[must_use]
    pub fn is_s3(&self) -> bool {
        S3_SCHEMES.contains(&self.url.scheme())
    }

    /// Bucket name for S3 locations.
    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        if self.is_s3() {
            self.url.host_str()
        } else {
            None
        }
    }

    /// `scheme://bucket/` for S3, used as the object store registration key.
    #[must_use]
    pub fn store_url(&self) -> Option<Url> {
        let bucket = self.bucket()?;
        Url::parse(&format!("{}://{}/", self.url.scheme(), bucket)).ok()
    }

    /// Resolve a path relative to this root. Directories must end in `/`.
    pub fn join(&self, relative: &str) -> Result<Url> {
        self.url
            .join(relative.trim_start_matches('/'))
            .map_err(|e| EtlError::InvalidLocation {
                location: format!("{}{}", self.url, relative),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
