//! SysDB key namespace.
//!
//! Every record lives at `sysdb/<entity>/<id>/<kind>`, where `kind` is either
//! `config` (administrative intent) or `status` (observed state). Keys are
//! plain strings; this module only builds and splits them.

use std::fmt;

use crate::error::{SysdbError, SysdbResult};

/// Root segment shared by every SysDB key.
pub const SYSDB_ROOT: &str = "sysdb";

/// Entity segment for network interfaces.
pub const INTERFACE_ENTITY: &str = "interface";

/// Key separator.
pub const KEY_SEPARATOR: char = '/';

/// Scan pattern matching every interface status record.
pub const INTERFACE_STATUS_PATTERN: &str = "sysdb/interface/*/status";

/// Scan pattern matching every interface config record.
pub const INTERFACE_CONFIG_PATTERN: &str = "sysdb/interface/*/config";

const KEY_SEGMENTS: usize = 4;

/// Which half of an entity's state a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Administrative intent, written by operators.
    Config,
    /// Observed operational state, written by the control plane.
    Status,
}

impl RecordKind {
    /// Returns the key segment for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Config => "config",
            RecordKind::Status => "status",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "config" => Some(RecordKind::Config),
            "status" => Some(RecordKind::Status),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds `sysdb/<entity>/<id>/config`.
pub fn config_path(entity: &str, id: &str) -> String {
    record_path(entity, id, RecordKind::Config)
}

/// Builds `sysdb/<entity>/<id>/status`.
pub fn status_path(entity: &str, id: &str) -> String {
    record_path(entity, id, RecordKind::Status)
}

fn record_path(entity: &str, id: &str, kind: RecordKind) -> String {
    format!("{}/{}/{}/{}", SYSDB_ROOT, entity, id, kind)
}

/// Key of the config record for an interface.
pub fn config_key(name: &str) -> String {
    config_path(INTERFACE_ENTITY, name)
}

/// Key of the status record for an interface.
pub fn status_key(name: &str) -> String {
    status_path(INTERFACE_ENTITY, name)
}

/// Checks that `name` can address an interface key.
///
/// The name becomes the id segment, so it must be non-empty and must not
/// contain the key separator. Fails with [`SysdbError::InvalidInterfaceName`].
pub fn validate_interface_name(name: &str) -> SysdbResult<()> {
    if name.is_empty() || name.contains(KEY_SEPARATOR) {
        return Err(SysdbError::InvalidInterfaceName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// A SysDB key split into its segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysdbKey {
    /// Entity type (e.g. "interface").
    pub entity: String,
    /// Entity identifier (e.g. "eth1").
    pub id: String,
    /// Record kind.
    pub kind: RecordKind,
}

impl SysdbKey {
    /// Splits a raw key.
    ///
    /// Fails with [`SysdbError::MalformedKey`] unless the key has exactly four
    /// `/`-separated segments, starts with `sysdb`, has non-empty entity and
    /// id segments and ends in a known record kind.
    pub fn parse(key: &str) -> SysdbResult<Self> {
        let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        if parts.len() != KEY_SEGMENTS {
            return Err(SysdbError::malformed_key(
                key,
                format!("expected {} segments, found {}", KEY_SEGMENTS, parts.len()),
            ));
        }

        if parts[0] != SYSDB_ROOT {
            return Err(SysdbError::malformed_key(
                key,
                format!("root segment must be '{}'", SYSDB_ROOT),
            ));
        }

        if parts[1].is_empty() || parts[2].is_empty() {
            return Err(SysdbError::malformed_key(key, "empty entity or id segment"));
        }

        let kind = RecordKind::from_segment(parts[3]).ok_or_else(|| {
            SysdbError::malformed_key(key, format!("unknown record kind '{}'", parts[3]))
        })?;

        Ok(Self {
            entity: parts[1].to_string(),
            id: parts[2].to_string(),
            kind,
        })
    }

    /// Returns true if this key addresses an interface status record.
    pub fn is_interface_status(&self) -> bool {
        self.entity == INTERFACE_ENTITY && self.kind == RecordKind::Status
    }

    /// Key of the sibling record of the other kind.
    pub fn sibling(&self, kind: RecordKind) -> String {
        record_path(&self.entity, &self.id, kind)
    }
}

impl fmt::Display for SysdbKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&record_path(&self.entity, &self.id, self.kind))
    }
}
