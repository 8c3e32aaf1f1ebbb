use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::QuotaDefaults;

/// Service configuration, read from a TOML file. Every field has a default
/// so a partial file (or none at all) is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the registry database.
    pub data_dir: PathBuf,
    /// Connection URL for the live engine's administrative login. Usually
    /// left at the default here and supplied via `SQLWARD_ENGINE_URL` so the
    /// credential stays out of config files.
    pub engine_url: String,
    /// Host pattern new logins are keyed to, the `'%'` in `'user'@'%'`.
    pub login_host: String,
    /// Targets any actor may operate on (shared infrastructure accounts).
    pub open_targets: Vec<String>,
    /// Length of generated credentials.
    pub password_length: usize,
    /// Ceilings stamped onto new accounts.
    pub quota: QuotaDefaults,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Like [`Config::load`], but falls back to defaults when the file does
    /// not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join("sqlward.db")
    }

    /// Engine URL with the environment override applied.
    #[must_use]
    pub fn effective_engine_url(&self) -> String {
        std::env::var("SQLWARD_ENGINE_URL").unwrap_or_else(|_| self.engine_url.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            engine_url: "mysql://sqlward@localhost:3306/mysql".to_string(),
            login_host: "%".to_string(),
            open_targets: vec!["sql".to_string()],
            password_length: 10,
            quota: QuotaDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.login_host, "%");
        assert_eq!(config.password_length, 10);
        assert_eq!(config.quota.max_databases, 20);
        assert_eq!(config.quota.max_bytes, 100 * 1024 * 1024);
        assert_eq!(config.registry_path(), PathBuf::from("./data/sqlward.db"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            data_dir = "/var/lib/sqlward"

            [quota]
            max_databases = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/sqlward"));
        assert_eq!(config.quota.max_databases, 5);
        // Unset quota fields and top-level fields fall back.
        assert_eq!(config.quota.max_bytes, 100 * 1024 * 1024);
        assert_eq!(config.open_targets, vec!["sql".to_string()]);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config = Config::load_or_default("/nonexistent/sqlward.toml").unwrap();
        assert_eq!(config.password_length, 10);
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlward.toml");
        std::fs::write(&path, "data_dir = [not toml").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
