use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tenant principal: one login on the live engine plus the registry rows
/// that describe it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    /// Credential as stored at rest: base64 of the plaintext the engine was
    /// given. Kept out of every serialized payload.
    #[serde(skip)]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Hard ceilings for one account. Created alongside the account and removed
/// with it; an account without a quota row is an inconsistency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountQuota {
    pub account_id: i64,
    pub max_databases: i64,
    pub soft_bytes: i64,
    pub max_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Observed consumption, refreshed out of band by the usage collector.
/// `last_check` is `None` until the first collection runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageStat {
    pub account_id: i64,
    pub bytes_used: i64,
    pub last_check: Option<DateTime<Utc>>,
}

/// A provisioned database. `name` is the full `<owner>+<local>` form and is
/// globally unique. Disabled rows are kept for bookkeeping but do not count
/// against their owner's quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub bytes: i64,
    pub enabled: bool,
    pub last_check: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Per-database byte ceilings, administered out of band. Zero means no
/// per-database limit beyond the account-wide one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseQuota {
    pub database_id: i64,
    pub soft_bytes: i64,
    pub hard_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when registering an account; ids and timestamps are
/// assigned by the registry.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    /// Already encoded for rest.
    pub password: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Optional contact details attached to a new account.
#[derive(Debug, Clone, Default)]
pub struct ContactInfo {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Ceilings stamped onto every new account's quota row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaDefaults {
    pub max_databases: i64,
    pub soft_bytes: i64,
    pub max_bytes: i64,
}

impl Default for QuotaDefaults {
    fn default() -> Self {
        Self {
            max_databases: 20,
            soft_bytes: 90 * 1024 * 1024,
            max_bytes: 100 * 1024 * 1024,
        }
    }
}
