//! Test infrastructure for SysDB consumers
//!
//! Provides:
//! - Record fixtures for interface status and config
//! - Scenario seeding against any `SysDb`
//! - A containerised Redis environment
//! - SysDB verification helpers

pub mod fixtures;
mod redis_env;
mod verification;

pub use fixtures::*;
pub use redis_env::RedisTestEnv;
pub use verification::*;
