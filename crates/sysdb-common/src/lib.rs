//! SysDB schema and store access for MiniSwitch.
//!
//! SysDB is a shared hierarchical key-value store (Redis) holding two
//! independently written records per interface:
//!
//! | Key | Writer | Record |
//! |-----|--------|--------|
//! | `sysdb/interface/<name>/config` | operators (CLI) | [`ConfigRecord`] |
//! | `sysdb/interface/<name>/status` | control plane | [`StatusRecord`] |
//!
//! This crate provides:
//!
//! - [`schema`]: key construction and parsing
//! - [`records`]: record types with per-field defaults and fail-soft decoding
//! - [`SysDb`]: the get/set/scan trait, with [`MemoryStore`] and
//!   [`RedisStore`] implementations
//! - [`SysdbConfig`]: TOML configuration file
//!
//! # Example
//!
//! ```ignore
//! use sysdb_common::{parse_record, status_key, StatusRecord, SysDb};
//!
//! let raw = store.get(&status_key("eth0")).await?;
//! let status: StatusRecord =
//!     parse_record(&status_key("eth0"), raw.as_deref()).unwrap_or_default();
//! ```

pub mod config;
pub mod error;
pub mod records;
pub mod schema;
pub mod store;

#[cfg(feature = "redis")]
mod redis_store;

pub use config::{DatabaseConfig, MutatorConfig, SysdbConfig};
pub use error::{SysdbError, SysdbResult};
pub use records::{decode_record, parse_record, ConfigRecord, StatusRecord};
pub use schema::{config_key, status_key, validate_interface_name, RecordKind, SysdbKey};
pub use store::{glob_match, MemoryStore, SysDb};

#[cfg(feature = "redis")]
pub use redis_store::{RedisStore, SCAN_BATCH};
