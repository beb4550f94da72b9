//! Interface admin state mutator.
//!
//! Writes operator intent to the config record. The status record is never
//! read or written here; bringing operational state in line with intent is
//! the control plane's job.

use std::sync::Arc;

use sysdb_common::records::defaults;
use sysdb_common::{config_key, validate_interface_name, ConfigRecord, SysDb, SysdbResult};
use tracing::{info, instrument};

use crate::types::{AdminState, AdminStateChange, TargetState};

/// Source of `lastChanged` timestamps, in seconds since the Unix epoch.
pub type Clock = fn() -> i64;

fn wall_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Validated admin state writer.
pub struct IntfMutator {
    db: Arc<dyn SysDb>,
    user: String,
    clock: Clock,
}

impl IntfMutator {
    /// Creates a mutator that records writes as the default `admin` actor.
    pub fn new(db: Arc<dyn SysDb>) -> Self {
        Self {
            db,
            user: defaults::USER.to_string(),
            clock: wall_clock,
        }
    }

    /// Sets the actor recorded in the `user` field.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Replaces the wall clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the admin state of `name` to `requested` (`"up"` or `"down"`).
    ///
    /// The whole config record is replaced with exactly one store write. The
    /// write is unconditional: concurrent writers race and the last one wins.
    /// Validation failures return before touching the store.
    #[instrument(skip(self))]
    pub async fn set_admin_state(
        &self,
        name: &str,
        requested: &str,
    ) -> SysdbResult<AdminStateChange> {
        let target: TargetState = requested.parse()?;

        validate_interface_name(name)?;

        let key = config_key(name);
        let record = ConfigRecord::new(target.admin_enabled(), self.user.as_str(), (self.clock)());
        self.db.set(&key, &record.encode(&key)?).await?;

        let admin_state = AdminState::from(record.admin_enabled);
        info!("Interface {} admin state set to {}", name, admin_state);

        Ok(AdminStateChange {
            interface: name.to_string(),
            admin_state,
        })
    }
}
