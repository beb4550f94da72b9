//! Verification helpers for SysDB state
//!
//! Assertions work against any `SysDb`, so the same checks run on the
//! in-memory store and on a Redis container.

use sysdb_common::{config_key, decode_record, ConfigRecord, SysDb, SysdbError};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Store error: {0}")]
    Store(#[from] SysdbError),

    #[error("Expected key '{key}' not found")]
    KeyNotFound { key: String },

    #[error("Expected key '{key}' to be absent")]
    UnexpectedKey { key: String },

    #[error("Value mismatch for {key}:{field}: expected '{expected}', got '{actual}'")]
    ValueMismatch {
        key: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Expected {expected} keys matching pattern '{pattern}', found {actual}")]
    KeyCountMismatch {
        pattern: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// SysDB verification helper
pub struct SysdbVerifier<'a> {
    db: &'a dyn SysDb,
}

impl<'a> SysdbVerifier<'a> {
    /// Create a new verifier over `db`
    pub fn new(db: &'a dyn SysDb) -> Self {
        Self { db }
    }

    /// Verify that a key exists
    pub async fn assert_key_exists(&self, key: &str) -> VerifyResult<()> {
        match self.db.get(key).await? {
            Some(_) => Ok(()),
            None => Err(VerificationError::KeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// Verify that a key does not exist
    pub async fn assert_key_absent(&self, key: &str) -> VerifyResult<()> {
        match self.db.get(key).await? {
            Some(_) => Err(VerificationError::UnexpectedKey {
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Read and strictly decode an interface's config record
    pub async fn config_record(&self, name: &str) -> VerifyResult<ConfigRecord> {
        let key = config_key(name);
        let raw = self
            .db
            .get(&key)
            .await?
            .ok_or_else(|| VerificationError::KeyNotFound { key: key.clone() })?;
        Ok(decode_record(&key, &raw)?)
    }

    /// Verify an interface's stored `adminEnabled`
    pub async fn assert_admin_enabled(&self, name: &str, expected: bool) -> VerifyResult<()> {
        let record = self.config_record(name).await?;
        if record.admin_enabled != expected {
            return Err(VerificationError::ValueMismatch {
                key: config_key(name),
                field: "adminEnabled".to_string(),
                expected: expected.to_string(),
                actual: record.admin_enabled.to_string(),
            });
        }
        Ok(())
    }

    /// Verify that a specific number of keys match a pattern
    pub async fn assert_key_count(&self, pattern: &str, expected: usize) -> VerifyResult<()> {
        let actual = self.db.scan(pattern).await?.len();
        if actual != expected {
            return Err(VerificationError::KeyCountMismatch {
                pattern: pattern.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}
