//! Interface state types shared by the reconciler, mutator and renderers.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use sysdb_common::{ConfigRecord, StatusRecord, SysdbError};

/// Admin state as displayed, derived from `adminEnabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    Enabled,
    Disabled,
}

impl AdminState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminState::Enabled => "enabled",
            AdminState::Disabled => "disabled",
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, AdminState::Enabled)
    }
}

impl From<bool> for AdminState {
    fn from(enabled: bool) -> Self {
        if enabled {
            AdminState::Enabled
        } else {
            AdminState::Disabled
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin state an operator may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Up,
    Down,
}

impl TargetState {
    /// Accepted spellings, in the order they are reported to users.
    pub const VALID: &'static [&'static str] = &["up", "down"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetState::Up => "up",
            TargetState::Down => "down",
        }
    }

    /// Value written to `adminEnabled`.
    pub fn admin_enabled(&self) -> bool {
        matches!(self, TargetState::Up)
    }
}

impl FromStr for TargetState {
    type Err = SysdbError;

    /// Exact match only: no trimming, no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(TargetState::Up),
            "down" => Ok(TargetState::Down),
            other => Err(SysdbError::invalid_state(other, Self::VALID)),
        }
    }
}

/// One interface's config and status joined for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceView {
    pub name: String,
    pub admin_state: AdminState,
    pub oper_status: String,
    pub link_status: String,
    pub last_changed: String,
    pub reason: String,
}

impl InterfaceView {
    /// Joins the two records, substituting defaults for whichever is absent.
    pub fn from_records(
        name: impl Into<String>,
        status: Option<StatusRecord>,
        config: Option<ConfigRecord>,
    ) -> Self {
        let status = status.unwrap_or_default();
        let config = config.unwrap_or_default();

        Self {
            name: name.into(),
            admin_state: AdminState::from(config.admin_enabled),
            oper_status: status.oper_status,
            link_status: status.link_status,
            last_changed: status.last_changed,
            reason: status.reason,
        }
    }
}

/// Confirmation returned by a successful admin-state write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStateChange {
    pub interface: String,
    pub admin_state: AdminState,
}

impl fmt::Display for AdminStateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interface {} admin state set to {}",
            self.interface, self.admin_state
        )
    }
}
