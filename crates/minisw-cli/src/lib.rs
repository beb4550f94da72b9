//! MiniSwitch interface state CLI.
//!
//! Operators read and change interface admin state through SysDB:
//!
//! - [`IntfReconciler`] joins each interface's `status` record (written by
//!   the control plane) with its `config` record (written by operators) into
//!   an [`InterfaceView`]. Only interfaces with a status record are listed.
//! - [`IntfMutator`] validates a requested `up`/`down` state and overwrites
//!   the interface's `config` record.
//!
//! Neither component waits for the other or for the control plane to act on
//! a change; `status` converges toward `config` asynchronously, if at all.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use minisw_cli::{IntfMutator, IntfReconciler};
//! use sysdb_common::MemoryStore;
//!
//! let db = Arc::new(MemoryStore::new());
//! IntfMutator::new(db.clone()).set_admin_state("eth1", "up").await?;
//! let views = IntfReconciler::new(db).show_interfaces().await?;
//! ```

mod mutator;
mod reconciler;
pub mod table;
mod types;

pub use mutator::{Clock, IntfMutator};
pub use reconciler::{sort_by_name, IntfReconciler};
pub use types::{AdminState, AdminStateChange, InterfaceView, TargetState};
