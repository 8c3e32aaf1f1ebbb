use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which layer detected that a name is already taken.
///
/// `Metadata` means the registry's uniqueness constraint fired before the
/// live engine was contacted. `Sql` means the registry accepted the name but
/// the engine refused it, which happens when an object exists on the server
/// without a registry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictLayer {
    Metadata,
    Sql,
}

impl std::fmt::Display for ConflictLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictLayer::Metadata => f.write_str("metadata"),
            ConflictLayer::Sql => f.write_str("sql"),
        }
    }
}

/// The first quota ceiling a database creation would cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuotaBreach {
    #[error("database quota exceeded: {used} of {limit} enabled databases in use")]
    Databases { used: i64, limit: i64 },

    #[error("storage quota exceeded: {used} of {limit} bytes in use")]
    Bytes { used: i64, limit: i64 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("registry error: {0}")]
    Registry(#[from] rusqlite::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{name} already exists")]
    AlreadyExists { layer: ConflictLayer, name: String },

    #[error(transparent)]
    QuotaExceeded(#[from] QuotaBreach),

    #[error("unauthorized")]
    Unauthorized,

    #[error("expected exactly one argument, got {0}")]
    InvalidArguments(usize),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("account {username} still owns {count} databases")]
    DatabasesExist { username: String, count: i64 },

    #[error("engine error: {0}")]
    Engine(#[from] sqlx::Error),

    /// Registry state that should be impossible: duplicate rows behind a
    /// unique name, or an account missing its quota or usage record.
    #[error("registry inconsistency: {0}")]
    Inconsistent(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Internal failures abort the invocation with a bare diagnostic instead
    /// of a structured failure payload. Everything else is a refusal the
    /// caller can act on.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::Registry(_)
                | Error::Inconsistent(_)
                | Error::Config(_)
                | Error::Io(_)
                | Error::Serialize(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
