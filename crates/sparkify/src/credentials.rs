// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! AWS credentials from an INI file with an `[AWS]` section:
//!
//! ```ini
//! [AWS]
//! AWS_ACCESS_KEY_ID = AKIA...
//! AWS_SECRET_ACCESS_KEY = ...
//! ```
//!
//! The values are handed to the session factory and the provisioner
//! directly; they are never exported into the process environment.

use crate::Result;
use crate::error::EtlError;
use ini::Ini;
use std::fmt;
use std::path::Path;

pub const SECTION: &str = "AWS";
pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

// Keep the secret out of logs and panic messages.
impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl AwsCredentials {
    fn from_ini(ini: &Ini, source: &str) -> Result<Self> {
        let section = ini.section(Some(SECTION)).ok_or_else(|| {
            EtlError::Credentials(format!("{source}: missing [{SECTION}] section"))
        })?;

        let value = |key: &str| -> Result<String> {
            match section.get(key).map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => Err(EtlError::Credentials(format!(
                    "{source}: [{SECTION}] {key} is missing or empty"
                ))),
            }
        };

        Ok(Self {
            access_key_id: value(ACCESS_KEY_ID)?,
            secret_access_key: value(SECRET_ACCESS_KEY)?,
        })
    }
}

/// Load credentials from an INI file on disk.
pub fn load_credentials<P: AsRef<Path>>(path: P) -> Result<AwsCredentials> {
    let path = path.as_ref();
    let ini = Ini::load_from_file(path)?;
    AwsCredentials::from_ini(&ini, &path.display().to_string())
}

/// Parse credentials from INI text.
pub fn parse_credentials(content: &str) -> Result<AwsCredentials> {
    let ini = Ini::load_from_str(content).map_err(|e| EtlError::Credentials(e.to_string()))?;
    AwsCredentials::from_ini(&ini, "<inline>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_credentials() -> Result<()> {
        let creds = parse_credentials(
            "[AWS]\nAWS_ACCESS_KEY_ID = AKIAEXAMPLE\nAWS_SECRET_ACCESS_KEY=s3cr3t\n",
        )?;
        assert_eq!(creds.access_key_id, "AKIAEXAMPLE");
        assert_eq!(creds.secret_access_key, "s3cr3t");
        Ok(())
    }

    #[test]
    fn test_debug_redacts_secret() -> Result<()> {
        let creds = parse_credentials("[AWS]\nAWS_ACCESS_KEY_ID=id\nAWS_SECRET_ACCESS_KEY=hunter2\n")?;
        let shown = format!("{creds:?}");
        assert!(shown.contains("id"));
        assert!(!shown.contains("hunter2"));
        Ok(())
    }

    #[test]
    fn test_missing_section_or_key() {
        let err = parse_credentials("[DEFAULT]\nAWS_ACCESS_KEY_ID=x\n").expect_err("no section");
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = parse_credentials("[AWS]\nAWS_ACCESS_KEY_ID=x\nAWS_SECRET_ACCESS_KEY=\n")
            .expect_err("empty secret");
        assert!(err.to_string().contains(SECRET_ACCESS_KEY));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_credentials(dir.path().join("dl.cfg")).expect_err("no file");
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dl.cfg");
        std::fs::write(&path, "[AWS]\nAWS_ACCESS_KEY_ID=a\nAWS_SECRET_ACCESS_KEY=b\n")
            .expect("write");
        let creds = load_credentials(&path)?;
        assert_eq!(creds.access_key_id, "a");
        Ok(())
    }
}
