use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::Registry;
use super::schema::SCHEMA;
use crate::error::{ConflictLayer, Error, QuotaBreach, Result};
use crate::types::*;

pub struct SqliteRegistry {
    conn: Mutex<Connection>,
}

impl SqliteRegistry {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows administrative tooling to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in registry: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn format_optional(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.as_ref().map(format_datetime)
}

fn parse_optional(s: Option<String>) -> Option<DateTime<Utc>> {
    s.map(|s| parse_datetime(&s))
}

impl Registry for SqliteRegistry {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Account operations

    fn create_account(&self, account: &NewAccount, defaults: &QuotaDefaults) -> Result<Account> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let created_at = Utc::now();

        let result = tx.execute(
            "INSERT INTO accounts (username, password, full_name, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.username,
                account.password,
                account.full_name,
                account.email,
                format_datetime(&created_at),
            ],
        );
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(Error::AlreadyExists {
                    layer: ConflictLayer::Metadata,
                    name: account.username.clone(),
                });
            }
            Err(e) => return Err(Error::from(e)),
        }
        let account_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO account_quotas (account_id, max_databases, soft_bytes, max_bytes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account_id,
                defaults.max_databases,
                defaults.soft_bytes,
                defaults.max_bytes,
                format_datetime(&created_at),
            ],
        )?;
        tx.execute(
            "INSERT INTO usage_stats (account_id, bytes_used, last_check)
             VALUES (?1, 0, NULL)",
            params![account_id],
        )?;
        tx.commit()?;

        Ok(Account {
            id: account_id,
            username: account.username.clone(),
            password: account.password.clone(),
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            created_at,
        })
    }

    fn get_account(&self, username: &str) -> Result<Option<Account>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT account_id, username, password, full_name, email, created_at
             FROM accounts WHERE username = ?1 LIMIT 2",
        )?;
        let rows = stmt.query_map(params![username], |row| {
            Ok(Account {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                full_name: row.get(3)?,
                email: row.get(4)?,
                created_at: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;
        let mut accounts = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        match accounts.len() {
            0 => Ok(None),
            1 => Ok(accounts.pop()),
            _ => Err(Error::Inconsistent(format!(
                "multiple accounts named {username}"
            ))),
        }
    }

    fn set_password(&self, account_id: i64, encoded: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE accounts SET password = ?1 WHERE account_id = ?2",
            params![encoded, account_id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(format!("account #{account_id}")));
        }
        Ok(())
    }

    fn delete_account(&self, account_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM accounts WHERE account_id = ?1",
            params![account_id],
        )?;
        Ok(rows > 0)
    }

    fn restore_account(
        &self,
        account: &Account,
        quota: &AccountQuota,
        usage: &UsageStat,
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO accounts (account_id, username, password, full_name, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account.id,
                account.username,
                account.password,
                account.full_name,
                account.email,
                format_datetime(&account.created_at),
            ],
        )?;
        tx.execute(
            "INSERT INTO account_quotas (account_id, max_databases, soft_bytes, max_bytes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.id,
                quota.max_databases,
                quota.soft_bytes,
                quota.max_bytes,
                format_datetime(&quota.created_at),
            ],
        )?;
        tx.execute(
            "INSERT INTO usage_stats (account_id, bytes_used, last_check)
             VALUES (?1, ?2, ?3)",
            params![account.id, usage.bytes_used, format_optional(&usage.last_check)],
        )?;
        tx.commit()?;
        Ok(())
    }

    // Quota and usage reads

    fn get_account_quota(&self, account_id: i64) -> Result<Option<AccountQuota>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT account_id, max_databases, soft_bytes, max_bytes, created_at
             FROM account_quotas WHERE account_id = ?1",
            params![account_id],
            |row| {
                Ok(AccountQuota {
                    account_id: row.get(0)?,
                    max_databases: row.get(1)?,
                    soft_bytes: row.get(2)?,
                    max_bytes: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_usage(&self, account_id: i64) -> Result<Option<UsageStat>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT account_id, bytes_used, last_check
             FROM usage_stats WHERE account_id = ?1",
            params![account_id],
            |row| {
                Ok(UsageStat {
                    account_id: row.get(0)?,
                    bytes_used: row.get(1)?,
                    last_check: parse_optional(row.get(2)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Database operations

    fn create_database(&self, owner_id: i64, name: &str, max_databases: i64) -> Result<Database> {
        let mut conn = self.conn();
        // Immediate so the count below holds until this insert commits.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let created_at = Utc::now();

        let enabled: i64 = tx.query_row(
            "SELECT COUNT(*) FROM databases d
             JOIN db_owners o ON o.database_id = d.database_id
             WHERE o.account_id = ?1 AND d.enabled = 1",
            params![owner_id],
            |row| row.get(0),
        )?;
        if enabled >= max_databases {
            return Err(Error::QuotaExceeded(QuotaBreach::Databases {
                used: enabled,
                limit: max_databases,
            }));
        }

        let result = tx.execute(
            "INSERT INTO databases (name, bytes, enabled, last_check, created_at)
             VALUES (?1, 0, 1, NULL, ?2)",
            params![name, format_datetime(&created_at)],
        );
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(Error::AlreadyExists {
                    layer: ConflictLayer::Metadata,
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(Error::from(e)),
        }
        let database_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO db_owners (database_id, account_id) VALUES (?1, ?2)",
            params![database_id, owner_id],
        )?;
        tx.execute(
            "INSERT INTO db_quotas (database_id, created_at) VALUES (?1, ?2)",
            params![database_id, format_datetime(&created_at)],
        )?;
        tx.commit()?;

        Ok(Database {
            id: database_id,
            name: name.to_string(),
            owner_id,
            bytes: 0,
            enabled: true,
            last_check: None,
            created_at,
        })
    }

    fn get_database(&self, name: &str) -> Result<Option<Database>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT d.database_id, d.name, o.account_id, d.bytes, d.enabled, d.last_check, d.created_at
             FROM databases d
             JOIN db_owners o ON o.database_id = d.database_id
             WHERE d.name = ?1 LIMIT 2",
        )?;
        let rows = stmt.query_map(params![name], |row| {
            Ok(Database {
                id: row.get(0)?,
                name: row.get(1)?,
                owner_id: row.get(2)?,
                bytes: row.get(3)?,
                enabled: row.get(4)?,
                last_check: parse_optional(row.get(5)?),
                created_at: parse_datetime(&row.get::<_, String>(6)?),
            })
        })?;
        let mut databases = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        match databases.len() {
            0 => Ok(None),
            1 => Ok(databases.pop()),
            _ => Err(Error::Inconsistent(format!(
                "multiple databases named {name}"
            ))),
        }
    }

    fn get_database_quota(&self, database_id: i64) -> Result<Option<DatabaseQuota>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT database_id, soft_bytes, hard_bytes, created_at
             FROM db_quotas WHERE database_id = ?1",
            params![database_id],
            |row| {
                Ok(DatabaseQuota {
                    database_id: row.get(0)?,
                    soft_bytes: row.get(1)?,
                    hard_bytes: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_database(&self, database_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM databases WHERE database_id = ?1",
            params![database_id],
        )?;
        Ok(rows > 0)
    }

    fn restore_database(&self, database: &Database, quota: &DatabaseQuota) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO databases (database_id, name, bytes, enabled, last_check, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                database.id,
                database.name,
                database.bytes,
                database.enabled,
                format_optional(&database.last_check),
                format_datetime(&database.created_at),
            ],
        )?;
        tx.execute(
            "INSERT INTO db_owners (database_id, account_id) VALUES (?1, ?2)",
            params![database.id, database.owner_id],
        )?;
        tx.execute(
            "INSERT INTO db_quotas (database_id, soft_bytes, hard_bytes, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                database.id,
                quota.soft_bytes,
                quota.hard_bytes,
                format_datetime(&quota.created_at),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn count_databases(&self, owner_id: i64) -> Result<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM db_owners WHERE account_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
    }

    fn count_enabled_databases(&self, owner_id: i64) -> Result<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM databases d
             JOIN db_owners o ON o.database_id = d.database_id
             WHERE o.account_id = ?1 AND d.enabled = 1",
            params![owner_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
    }
}
