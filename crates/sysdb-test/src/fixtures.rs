//! Test fixtures for SysDB interface records
//!
//! Status records are written the way the control plane writes them (with
//! `reason` and a numeric `lastChanged`); config records the way the CLI does.

use serde_json::json;
use sysdb_common::{config_key, status_key, SysDb, SysdbResult};

/// One raw key/value pair to seed into a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEntry {
    /// Full SysDB key
    pub key: String,
    /// Raw stored value (not necessarily valid JSON)
    pub value: String,
}

impl SeedEntry {
    /// Create an entry from a key and raw value
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Interface status fixtures (control plane writes)
pub mod status_fixtures {
    use super::*;

    /// Status record with explicit oper and link states
    pub fn status(name: &str, oper: &str, link: &str) -> SeedEntry {
        let reason = if oper == "up" { "" } else { "linkDown" };
        SeedEntry::new(
            status_key(name),
            json!({
                "operStatus": oper,
                "linkStatus": link,
                "reason": reason,
                "lastChanged": 1_712_345_678,
            })
            .to_string(),
        )
    }

    /// Interface up with link detected
    pub fn oper_up(name: &str) -> SeedEntry {
        status(name, "up", "up")
    }

    /// Interface down with no link
    pub fn oper_down(name: &str) -> SeedEntry {
        status(name, "down", "down")
    }

    /// Link up but held down by admin intent
    pub fn admin_held_down(name: &str) -> SeedEntry {
        SeedEntry::new(
            status_key(name),
            json!({
                "operStatus": "down",
                "linkStatus": "up",
                "adminEnabled": false,
                "reason": "adminDisabled",
                "lastChanged": 1_712_345_678,
            })
            .to_string(),
        )
    }

    /// Value that is not JSON at all
    pub fn malformed(name: &str) -> SeedEntry {
        SeedEntry::new(status_key(name), "{operStatus: up")
    }

    /// Status record carrying only some fields
    pub fn partial(name: &str, oper: &str) -> SeedEntry {
        SeedEntry::new(status_key(name), json!({ "operStatus": oper }).to_string())
    }
}

/// Interface config fixtures (operator writes)
pub mod config_fixtures {
    use super::*;

    /// Admin enabled
    pub fn enabled(name: &str) -> SeedEntry {
        admin(name, true)
    }

    /// Admin disabled
    pub fn disabled(name: &str) -> SeedEntry {
        admin(name, false)
    }

    fn admin(name: &str, enabled: bool) -> SeedEntry {
        SeedEntry::new(
            config_key(name),
            json!({
                "adminEnabled": enabled,
                "user": "admin",
                "lastChanged": 1_712_340_000,
            })
            .to_string(),
        )
    }

    /// Value that is not JSON at all
    pub fn malformed(name: &str) -> SeedEntry {
        SeedEntry::new(config_key(name), "adminEnabled=true")
    }
}

/// Test scenario builder for seeding a store
#[derive(Debug, Clone)]
pub struct TestScenario {
    /// Scenario name
    pub name: String,
    /// Entries written in order
    pub entries: Vec<SeedEntry>,
}

impl TestScenario {
    /// Create a new, empty scenario
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add an entry to the scenario
    pub fn with(mut self, entry: SeedEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Write every entry to `db`
    pub async fn seed(&self, db: &dyn SysDb) -> SysdbResult<()> {
        for entry in &self.entries {
            db.set(&entry.key, &entry.value).await?;
        }
        Ok(())
    }
}
