mod mysql;
mod sql;

pub use mysql::MySqlEngine;

use async_trait::async_trait;

use crate::error::Result;

/// SqlEngine drives the privileged primitives on the live database server.
///
/// Callers commit registry state before invoking these, so implementations
/// may assume the metadata already records the intent being applied. Each
/// primitive maps to one administrative statement and reports the server's
/// verdict unmodified.
#[async_trait]
pub trait SqlEngine: Send + Sync {
    async fn create_login(&self, username: &str, host: &str, password: &str) -> Result<()>;
    async fn drop_login(&self, username: &str, host: &str) -> Result<()>;
    async fn change_password(&self, username: &str, host: &str, password: &str) -> Result<()>;
    async fn create_database(&self, name: &str) -> Result<()>;
    /// With `ignore_missing`, a database absent on the server is not an
    /// error. Used when the registry row is already gone or being unwound.
    async fn drop_database(&self, name: &str, ignore_missing: bool) -> Result<()>;
    async fn grant(&self, database: &str, username: &str, host: &str) -> Result<()>;
    async fn revoke(&self, database: &str, username: &str, host: &str) -> Result<()>;
}
