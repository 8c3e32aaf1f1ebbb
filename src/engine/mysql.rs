use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use super::{SqlEngine, sql};
use crate::error::Result;

/// Administrative connection to the MySQL server that hosts the tenant
/// logins and databases.
pub struct MySqlEngine {
    pool: MySqlPool,
}

impl MySqlEngine {
    /// Opens a lazy pool; the server is first contacted when a primitive
    /// runs, so read-only invocations that never reach the engine do not
    /// require it to be up.
    pub fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect_lazy(url)?;
        Ok(Self { pool })
    }

    // Statements carry credentials, so they are never logged here.
    async fn execute(&self, statement: String) -> Result<()> {
        sqlx::raw_sql(&statement).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SqlEngine for MySqlEngine {
    async fn create_login(&self, username: &str, host: &str, password: &str) -> Result<()> {
        self.execute(sql::create_login(username, host, password)).await
    }

    async fn drop_login(&self, username: &str, host: &str) -> Result<()> {
        self.execute(sql::drop_login(username, host)).await
    }

    async fn change_password(&self, username: &str, host: &str, password: &str) -> Result<()> {
        self.execute(sql::change_password(username, host, password)).await
    }

    async fn create_database(&self, name: &str) -> Result<()> {
        self.execute(sql::create_database(name)).await
    }

    async fn drop_database(&self, name: &str, ignore_missing: bool) -> Result<()> {
        self.execute(sql::drop_database(name, ignore_missing)).await
    }

    async fn grant(&self, database: &str, username: &str, host: &str) -> Result<()> {
        self.execute(sql::grant_all(database, username, host)).await
    }

    async fn revoke(&self, database: &str, username: &str, host: &str) -> Result<()> {
        self.execute(sql::revoke_all(database, username, host)).await
    }
}
