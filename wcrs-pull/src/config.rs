//! Puller configuration
//!
//! Unlike the scheduler, the puller runs unattended from a timer and
//! takes a strict required-environment model: a missing value is a
//! startup-fatal error, never a silent default.

use std::path::PathBuf;
use wcrs_common::{Error, Result};

/// Default retention window for staged audio, in days
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct PullConfig {
    /// Local staging tree, one subdirectory per show
    pub staging_root: PathBuf,
    /// Base URL of the scheduler's catalog endpoints
    pub catalog_url: String,
    /// Object-storage application key pair
    pub b2_key_id: String,
    pub b2_key: String,
    /// Staged files older than this many days are reclaimed
    pub retention_days: i64,
}

impl PullConfig {
    /// Read configuration from the environment
    pub fn from_env() -> Result<Self> {
        let retention_days = match std::env::var("WCRS_RETENTION_DAYS") {
            Ok(value) => value.parse().map_err(|_| {
                Error::Config(format!("WCRS_RETENTION_DAYS must be a number, got '{}'", value))
            })?,
            Err(_) => DEFAULT_RETENTION_DAYS,
        };

        Ok(Self {
            staging_root: PathBuf::from(required("WCRS_STAGING_ROOT")?),
            catalog_url: required("WCRS_CATALOG_URL")?,
            b2_key_id: required("WCRS_B2_KEY_ID")?,
            b2_key: required("WCRS_B2_KEY")?,
            retention_days,
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {} is not set", name)))
}
