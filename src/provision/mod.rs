mod password;
mod quota;
mod validation;

pub use password::{DEFAULT_PASSWORD_LENGTH, PasswordGenerator};
pub use quota::QuotaSnapshot;

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::engine::SqlEngine;
use crate::error::{ConflictLayer, Error, Result};
use crate::policy::AccessPolicy;
use crate::registry::Registry;
use crate::response::{CreatedDatabase, IssuedPassword};
use crate::types::{Account, AccountQuota, ContactInfo, NewAccount, QuotaDefaults, UsageStat};

/// Orchestrates every mutation as a two-phase sequence: authorize, commit
/// the registry, then apply the change on the live engine. When the engine
/// refuses, the registry write is undone before the error is reported, so
/// the registry never claims state the engine failed to reach.
///
/// The one tolerated exception is the privilege revoke after a successful
/// database drop; a stale grant on a dropped database is harmless and the
/// drop itself already happened.
pub struct Provisioner {
    registry: Arc<dyn Registry>,
    engine: Arc<dyn SqlEngine>,
    policy: AccessPolicy,
    passwords: PasswordGenerator,
    quota_defaults: QuotaDefaults,
    login_host: String,
}

impl Provisioner {
    pub fn new(registry: Arc<dyn Registry>, engine: Arc<dyn SqlEngine>, config: &Config) -> Self {
        Self {
            registry,
            engine,
            policy: AccessPolicy::new(config.open_targets.iter().cloned()),
            passwords: PasswordGenerator::new(config.password_length),
            quota_defaults: config.quota,
            login_host: config.login_host.clone(),
        }
    }

    /// Registers the target account and creates its login on the engine,
    /// returning the generated credential.
    pub async fn create_account(
        &self,
        actor: &str,
        target: &str,
        contact: &ContactInfo,
    ) -> Result<IssuedPassword> {
        self.policy.authorize(actor, target)?;
        validation::validate_username(target)?;

        let password = self.passwords.generate();
        let account = self.registry.create_account(
            &NewAccount {
                username: target.to_string(),
                password: BASE64.encode(&password),
                full_name: contact.full_name.clone(),
                email: contact.email.clone(),
            },
            &self.quota_defaults,
        )?;

        if let Err(e) = self
            .engine
            .create_login(target, &self.login_host, &password)
            .await
        {
            warn!("Login creation for {target} failed, removing account metadata: {e}");
            self.registry.delete_account(account.id)?;
            return Err(e);
        }

        info!("Provisioned account {target}");
        Ok(IssuedPassword { password })
    }

    /// Removes the target account and its login. Refuses while the account
    /// still owns databases; those must be dropped first.
    pub async fn delete_account(&self, actor: &str, target: &str) -> Result<()> {
        self.policy.authorize(actor, target)?;

        let account = self.lookup_account(target)?;
        let owned = self.registry.count_databases(account.id)?;
        if owned > 0 {
            return Err(Error::DatabasesExist {
                username: target.to_string(),
                count: owned,
            });
        }
        let quota = self.lookup_quota(&account)?;
        let usage = self.lookup_usage(&account)?;

        self.registry.delete_account(account.id)?;

        if let Err(e) = self
            .engine
            .drop_login(&account.username, &self.login_host)
            .await
        {
            warn!("Login drop for {target} failed, restoring account metadata: {e}");
            self.registry.restore_account(&account, &quota, &usage)?;
            return Err(e);
        }

        info!("Removed account {target}");
        Ok(())
    }

    /// Rotates the target's credential to the single supplied argument.
    pub async fn set_password(&self, actor: &str, target: &str, args: &[String]) -> Result<()> {
        self.policy.authorize(actor, target)?;
        let password = single_arg(args)?;

        let account = self.lookup_account(target)?;
        self.registry
            .set_password(account.id, &BASE64.encode(password))?;

        if let Err(e) = self
            .engine
            .change_password(&account.username, &self.login_host, password)
            .await
        {
            warn!("Password change for {target} failed, keeping previous credential: {e}");
            self.registry.set_password(account.id, &account.password)?;
            return Err(e);
        }

        info!("Rotated password for {target}");
        Ok(())
    }

    /// Rotates the target's credential to a fresh one and returns it.
    pub async fn generate_password(&self, actor: &str, target: &str) -> Result<IssuedPassword> {
        let password = self.passwords.generate();
        self.set_password(actor, target, std::slice::from_ref(&password))
            .await?;
        Ok(IssuedPassword { password })
    }

    /// Creates `<target>+<local>` for the target account: quota check,
    /// registry insert, engine creation, then a grant to the owner's login.
    pub async fn create_database(
        &self,
        actor: &str,
        target: &str,
        args: &[String],
    ) -> Result<CreatedDatabase> {
        self.policy.authorize(actor, target)?;
        let local = single_arg(args)?;
        validation::validate_database_name(target, local)?;

        let account = self.lookup_account(target)?;
        let quota = self.lookup_quota(&account)?;
        let usage = self.lookup_usage(&account)?;
        let enabled = self.registry.count_enabled_databases(account.id)?;
        QuotaSnapshot::new(enabled, &quota, &usage).admits_creation()?;

        let name = full_name(target, local);
        let database = self
            .registry
            .create_database(account.id, &name, quota.max_databases)?;

        if let Err(e) = self.engine.create_database(&name).await {
            warn!("Engine refused database {name}, removing metadata row: {e}");
            self.registry.delete_database(database.id)?;
            // The usual cause is an unregistered database squatting on the
            // name, so report it as a conflict on the engine side.
            return Err(Error::AlreadyExists {
                layer: ConflictLayer::Sql,
                name,
            });
        }

        if let Err(e) = self
            .engine
            .grant(&name, &account.username, &self.login_host)
            .await
        {
            warn!("Grant on {name} failed, unwinding creation: {e}");
            if let Err(drop_err) = self.engine.drop_database(&name, true).await {
                error!(
                    "Unwind drop of {name} failed, engine now has an orphan database: {drop_err}"
                );
            }
            self.registry.delete_database(database.id)?;
            return Err(e);
        }

        info!("Provisioned database {name}");
        Ok(CreatedDatabase { database: name })
    }

    /// Drops `<target>+<local>` from the registry and the engine, then
    /// revokes the owner's privileges on it.
    pub async fn drop_database(&self, actor: &str, target: &str, args: &[String]) -> Result<()> {
        self.policy.authorize(actor, target)?;
        let local = single_arg(args)?;
        let name = full_name(target, local);

        let database = self
            .registry
            .get_database(&name)?
            .ok_or_else(|| Error::NotFound(format!("database {name}")))?;
        let quota = self
            .registry
            .get_database_quota(database.id)?
            .ok_or_else(|| Error::Inconsistent(format!("database {name} has no quota record")))?;

        self.registry.delete_database(database.id)?;

        if let Err(e) = self.engine.drop_database(&name, true).await {
            warn!("Engine drop of {name} failed, restoring metadata row: {e}");
            self.registry.restore_database(&database, &quota)?;
            return Err(e);
        }

        if let Err(e) = self.engine.revoke(&name, target, &self.login_host).await {
            // The database is gone; a leftover grant carries no privileges.
            warn!("Revoke on dropped database {name} failed: {e}");
        }

        info!("Dropped database {name}");
        Ok(())
    }

    fn lookup_account(&self, username: &str) -> Result<Account> {
        self.registry
            .get_account(username)?
            .ok_or_else(|| Error::NotFound(format!("account {username}")))
    }

    fn lookup_quota(&self, account: &Account) -> Result<AccountQuota> {
        self.registry
            .get_account_quota(account.id)?
            .ok_or_else(|| {
                Error::Inconsistent(format!("account {} has no quota record", account.username))
            })
    }

    fn lookup_usage(&self, account: &Account) -> Result<UsageStat> {
        self.registry.get_usage(account.id)?.ok_or_else(|| {
            Error::Inconsistent(format!("account {} has no usage record", account.username))
        })
    }
}

fn single_arg(args: &[String]) -> Result<&str> {
    match args {
        [one] => Ok(one.as_str()),
        _ => Err(Error::InvalidArguments(args.len())),
    }
}

fn full_name(owner: &str, local: &str) -> String {
    format!("{owner}+{local}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_arg() {
        let args = vec!["only".to_string()];
        assert_eq!(single_arg(&args).unwrap(), "only");

        assert!(matches!(single_arg(&[]), Err(Error::InvalidArguments(0))));
        let two = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            single_arg(&two),
            Err(Error::InvalidArguments(2))
        ));
    }

    #[test]
    fn test_full_name_composition() {
        assert_eq!(full_name("alice", "web"), "alice+web");
    }
}
