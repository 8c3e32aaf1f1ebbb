mod schema;
mod sqlite;

pub use sqlite::SqliteRegistry;

use crate::error::Result;
use crate::types::*;

/// Registry defines the metadata-store interface.
///
/// The registry is the source of truth for which accounts and databases are
/// supposed to exist. Every mutation that spans multiple rows commits them
/// in one transaction, and every mutation commits before the corresponding
/// live-engine call runs, so a failed engine call can be compensated by
/// undoing the registry write.
pub trait Registry: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Account operations
    fn create_account(&self, account: &NewAccount, defaults: &QuotaDefaults) -> Result<Account>;
    fn get_account(&self, username: &str) -> Result<Option<Account>>;
    fn set_password(&self, account_id: i64, encoded: &str) -> Result<()>;
    fn delete_account(&self, account_id: i64) -> Result<bool>;
    /// Re-inserts a deleted account with its original id, quota, and usage.
    fn restore_account(
        &self,
        account: &Account,
        quota: &AccountQuota,
        usage: &UsageStat,
    ) -> Result<()>;

    // Quota and usage reads
    fn get_account_quota(&self, account_id: i64) -> Result<Option<AccountQuota>>;
    fn get_usage(&self, account_id: i64) -> Result<Option<UsageStat>>;

    // Database operations
    /// Inserts the database, its ownership link, and a default per-database
    /// quota row. Re-counts the owner's enabled databases inside the insert
    /// transaction and refuses when `max_databases` are already in use, so
    /// two concurrent creations cannot both slip under the ceiling.
    fn create_database(&self, owner_id: i64, name: &str, max_databases: i64) -> Result<Database>;
    fn get_database(&self, name: &str) -> Result<Option<Database>>;
    fn get_database_quota(&self, database_id: i64) -> Result<Option<DatabaseQuota>>;
    fn delete_database(&self, database_id: i64) -> Result<bool>;
    /// Re-inserts a deleted database with its original id, owner, and quota.
    fn restore_database(&self, database: &Database, quota: &DatabaseQuota) -> Result<()>;
    fn count_databases(&self, owner_id: i64) -> Result<i64>;
    fn count_enabled_databases(&self, owner_id: i64) -> Result<i64>;
}
