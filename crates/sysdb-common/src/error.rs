//! Error types for SysDB access.
//!
//! Only [`SysdbError::StoreUnavailable`] and the two rejection variants
//! ([`SysdbError::InvalidState`], [`SysdbError::InvalidInterfaceName`]) ever
//! reach a user. Malformed keys and records are reported through this type by
//! the strict parsing functions, but the reconciler absorbs them.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for SysDB operations.
pub type SysdbResult<T> = Result<T, SysdbError>;

/// Errors that can occur while reading or writing SysDB state.
#[derive(Debug, Error)]
pub enum SysdbError {
    /// The store could not be reached or rejected a command.
    #[error("SysDB unavailable during {operation}: {message}")]
    StoreUnavailable {
        /// The store operation that failed (e.g. "get", "set", "scan").
        operation: String,
        /// Error message from the store client.
        message: String,
    },

    /// A stored value did not decode as the expected record.
    #[error("Malformed record at '{key}': {message}")]
    MalformedRecord {
        /// The key holding the value.
        key: String,
        /// Decoder message.
        message: String,
    },

    /// A key did not match the `sysdb/<entity>/<id>/<kind>` layout.
    #[error("Malformed key '{key}': {reason}")]
    MalformedKey {
        /// The offending key.
        key: String,
        /// Why the key was rejected.
        reason: String,
    },

    /// A requested admin state is outside the allowed set.
    #[error("Invalid state '{value}'. Valid states are: {}", .allowed.join(", "))]
    InvalidState {
        /// The rejected value.
        value: String,
        /// The values that would have been accepted.
        allowed: Vec<String>,
    },

    /// An interface name that cannot address a SysDB key.
    #[error("Invalid interface name '{name}'")]
    InvalidInterfaceName {
        /// The rejected name.
        name: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error in {}: {message}", .path.display())]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

impl SysdbError {
    /// Creates a store unavailable error.
    pub fn unavailable(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::StoreUnavailable {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Creates a malformed record error.
    pub fn malformed_record(key: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedRecord {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Creates a malformed key error.
    pub fn malformed_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid state error listing the accepted values.
    pub fn invalid_state(value: impl Into<String>, allowed: &[&str]) -> Self {
        Self::InvalidState {
            value: value.into(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Returns true if this error came from the store rather than from
    /// validating caller input.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, SysdbError::StoreUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_lists_allowed_values() {
        let err = SysdbError::invalid_state("enabled", &["up", "down"]);
        assert_eq!(
            err.to_string(),
            "Invalid state 'enabled'. Valid states are: up, down"
        );
    }

    #[test]
    fn test_unavailable_display() {
        let err = SysdbError::unavailable("scan", "Connection refused");
        assert_eq!(
            err.to_string(),
            "SysDB unavailable during scan: Connection refused"
        );
        assert!(err.is_store_failure());
    }

    #[test]
    fn test_malformed_key_display() {
        let err = SysdbError::malformed_key("sysdb/interface/status", "expected 4 segments");
        assert!(err.to_string().contains("sysdb/interface/status"));
        assert!(!err.is_store_failure());
    }

    #[test]
    fn test_config_error_display() {
        let err = SysdbError::Config {
            path: PathBuf::from("/etc/minisw/sysdb.toml"),
            message: "expected a table".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Configuration error in /etc/minisw/sysdb.toml: expected a table"
        );
    }
}
