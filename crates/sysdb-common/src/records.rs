//! Record shapes stored under SysDB keys.
//!
//! Values are JSON objects using camelCase field names shared with every
//! other producer and consumer of the store. Every field carries a default so
//! a partially written record still decodes, and a field holding the wrong
//! JSON type takes its default without affecting its neighbours.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{SysdbError, SysdbResult};

/// Field names as they appear in stored JSON.
pub mod fields {
    /// Desired admin state (config).
    pub const ADMIN_ENABLED: &str = "adminEnabled";
    /// Last writer of a config record.
    pub const USER: &str = "user";
    /// Time of the last change (both record kinds).
    pub const LAST_CHANGED: &str = "lastChanged";
    /// Operational status (status).
    pub const OPER_STATUS: &str = "operStatus";
    /// Physical link state (status).
    pub const LINK_STATUS: &str = "linkStatus";
    /// Reason for a down status (status).
    pub const REASON: &str = "reason";
}

/// Defaults substituted when a record or a field is missing.
pub mod defaults {
    /// Admin state when no config record exists.
    pub const ADMIN_ENABLED: bool = false;
    /// Operational status when no status record exists.
    pub const OPER_STATUS: &str = "unknown";
    /// Link status when no status record exists.
    pub const LINK_STATUS: &str = "unknown";
    /// Actor recorded on config writes unless configured otherwise.
    pub const USER: &str = "admin";
}

/// Administrative intent for one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    /// `true` when the operator wants the interface up.
    #[serde(default, deserialize_with = "lenient_default")]
    pub admin_enabled: bool,

    /// Identity of the actor that wrote the record.
    #[serde(default, deserialize_with = "lenient_default")]
    pub user: String,

    /// Seconds since the Unix epoch of the write.
    #[serde(default, deserialize_with = "lenient_default")]
    pub last_changed: i64,
}

impl ConfigRecord {
    /// Creates a record for a fresh write.
    pub fn new(admin_enabled: bool, user: impl Into<String>, last_changed: i64) -> Self {
        Self {
            admin_enabled,
            user: user.into(),
            last_changed,
        }
    }

    /// Serializes the record for storage under `key`.
    pub fn encode(&self, key: &str) -> SysdbResult<String> {
        serde_json::to_string(self).map_err(|e| SysdbError::malformed_record(key, e))
    }
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            admin_enabled: defaults::ADMIN_ENABLED,
            user: String::new(),
            last_changed: 0,
        }
    }
}

/// Observed operational state for one interface.
///
/// Written by the control plane. Unknown extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    #[serde(default = "default_oper_status", deserialize_with = "lenient_oper_status")]
    pub oper_status: String,

    #[serde(default = "default_link_status", deserialize_with = "lenient_link_status")]
    pub link_status: String,

    /// Either a string or an epoch timestamp in storage; kept as text.
    #[serde(default, deserialize_with = "timestamp_text")]
    pub last_changed: String,

    #[serde(default, deserialize_with = "lenient_default")]
    pub reason: String,
}

impl Default for StatusRecord {
    fn default() -> Self {
        Self {
            oper_status: default_oper_status(),
            link_status: default_link_status(),
            last_changed: String::new(),
            reason: String::new(),
        }
    }
}

fn default_oper_status() -> String {
    defaults::OPER_STATUS.to_string()
}

fn default_link_status() -> String {
    defaults::LINK_STATUS.to_string()
}

/// Decodes one field, substituting `default` when the stored JSON has the
/// wrong type for it.
fn lenient<'de, D, T>(deserializer: D, default: fn() -> T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        debug!("Ignoring malformed field: {}", e);
        default()
    }))
}

fn lenient_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient(deserializer, T::default)
}

fn lenient_oper_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    lenient(deserializer, default_oper_status)
}

fn lenient_link_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    lenient(deserializer, default_link_status)
}

fn timestamp_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(secs), _) => secs.to_string(),
            (None, Some(secs)) => secs.to_string(),
            (None, None) => n.to_string(),
        },
        Value::Null => String::new(),
        other => {
            debug!("Ignoring malformed timestamp: {}", other);
            String::new()
        }
    })
}

/// Strictly decodes a stored value.
///
/// The value must be a JSON object; fields absent from it, or holding the
/// wrong type, take their defaults. Anything else fails with
/// [`SysdbError::MalformedRecord`].
pub fn decode_record<R: DeserializeOwned>(key: &str, raw: &str) -> SysdbResult<R> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| SysdbError::malformed_record(key, e))?;

    if !value.is_object() {
        return Err(SysdbError::malformed_record(key, "value is not a JSON object"));
    }

    serde_json::from_value(value).map_err(|e| SysdbError::malformed_record(key, e))
}

/// Decodes a stored value, treating absent and malformed values alike.
///
/// Returns `None` when there is no value or when it fails to decode; callers
/// substitute defaults in both cases.
pub fn parse_record<R: DeserializeOwned>(key: &str, raw: Option<&str>) -> Option<R> {
    let raw = raw?;
    match decode_record(key, raw) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Treating record as absent: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const KEY: &str = "sysdb/interface/eth0/status";

    #[test]
    fn test_config_record_field_names() {
        let record = ConfigRecord::new(true, "admin", 1700000000);
        let value: serde_json::Value = serde_json::from_str(&record.encode(KEY).unwrap()).unwrap();
        assert_eq!(value[fields::ADMIN_ENABLED], true);
        assert_eq!(value[fields::USER], "admin");
        assert_eq!(value[fields::LAST_CHANGED], 1700000000);
    }

    #[test]
    fn test_status_record_full() {
        let raw = serde_json::json!({
            "operStatus": "up",
            "linkStatus": "up",
            "lastChanged": "2024-01-01 10:00",
            "reason": "",
        });
        let record: StatusRecord = decode_record(KEY, &raw.to_string()).unwrap();
        assert_eq!(record.oper_status, "up");
        assert_eq!(record.link_status, "up");
        assert_eq!(record.last_changed, "2024-01-01 10:00");
    }

    #[test]
    fn test_status_record_numeric_timestamp() {
        let raw = serde_json::json!({
            "operStatus": "down",
            "linkStatus": "up",
            "adminEnabled": false,
            "reason": "adminDisabled",
            "lastChanged": 1712345678,
        });
        let record: StatusRecord = decode_record(KEY, &raw.to_string()).unwrap();
        assert_eq!(record.last_changed, "1712345678");
        assert_eq!(record.reason, "adminDisabled");
    }

    #[test]
    fn test_status_record_partial_takes_defaults() {
        let record: StatusRecord = decode_record(KEY, r#"{"operStatus":"up"}"#).unwrap();
        assert_eq!(record.oper_status, "up");
        assert_eq!(record.link_status, "unknown");
        assert_eq!(record.last_changed, "");

        let empty: StatusRecord = decode_record(KEY, "{}").unwrap();
        assert_eq!(empty, StatusRecord::default());
    }

    #[test]
    fn test_null_timestamp_is_empty() {
        let record: StatusRecord = decode_record(KEY, r#"{"lastChanged":null}"#).unwrap();
        assert_eq!(record.last_changed, "");
    }

    #[test]
    fn test_config_record_partial_takes_defaults() {
        let record: ConfigRecord = decode_record(KEY, r#"{"user":"ops"}"#).unwrap();
        assert!(!record.admin_enabled);
        assert_eq!(record.user, "ops");
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        for raw in ["not json", "null", "42", "[true, \"admin\", 5]", "\"up\""] {
            let err = decode_record::<ConfigRecord>(KEY, raw).unwrap_err();
            assert!(matches!(err, SysdbError::MalformedRecord { .. }), "{}", raw);
        }
    }

    #[test]
    fn test_wrong_field_type_takes_field_default() {
        let record: ConfigRecord =
            decode_record(KEY, r#"{"adminEnabled":"yes","user":"ops","lastChanged":7}"#).unwrap();
        assert_eq!(record, ConfigRecord::new(false, "ops", 7));

        let record: StatusRecord =
            decode_record(KEY, r#"{"operStatus":"up","lastChanged":true}"#).unwrap();
        assert_eq!(record.oper_status, "up");
        assert_eq!(record.link_status, "unknown");
        assert_eq!(record.last_changed, "");

        let record: StatusRecord =
            decode_record(KEY, r#"{"operStatus":5,"linkStatus":"up","reason":null}"#).unwrap();
        assert_eq!(record.oper_status, "unknown");
        assert_eq!(record.link_status, "up");
        assert_eq!(record.reason, "");
    }

    #[test]
    fn test_parse_record_is_soft() {
        assert_eq!(parse_record::<StatusRecord>(KEY, None), None);
        assert_eq!(parse_record::<StatusRecord>(KEY, Some("{{{")), None);
        assert_eq!(
            parse_record::<StatusRecord>(KEY, Some("{}")),
            Some(StatusRecord::default())
        );
    }
}
