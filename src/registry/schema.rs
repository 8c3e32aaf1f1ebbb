pub const SCHEMA: &str = r#"
-- Accounts are the tenant principals; username doubles as the engine login
CREATE TABLE IF NOT EXISTS accounts (
    account_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,       -- base64 of the engine credential
    full_name TEXT,
    email TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Hard ceilings, one row per account, created with the account
CREATE TABLE IF NOT EXISTS account_quotas (
    account_id INTEGER PRIMARY KEY REFERENCES accounts(account_id) ON DELETE CASCADE,
    max_databases INTEGER NOT NULL,
    soft_bytes INTEGER NOT NULL,
    max_bytes INTEGER NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Observed consumption, refreshed out of band by the usage collector
CREATE TABLE IF NOT EXISTS usage_stats (
    account_id INTEGER PRIMARY KEY REFERENCES accounts(account_id) ON DELETE CASCADE,
    bytes_used INTEGER NOT NULL DEFAULT 0,
    last_check TEXT               -- NULL = never collected
);

-- Databases; name is the full '<owner>+<local>' form
CREATE TABLE IF NOT EXISTS databases (
    database_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    bytes INTEGER NOT NULL DEFAULT 0,
    enabled INTEGER NOT NULL DEFAULT 1,  -- disabled rows stop counting against quota
    last_check TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Ownership link; no cascade from accounts, owned rows block account deletion
CREATE TABLE IF NOT EXISTS db_owners (
    database_id INTEGER PRIMARY KEY REFERENCES databases(database_id) ON DELETE CASCADE,
    account_id INTEGER NOT NULL REFERENCES accounts(account_id)
);

-- Per-database byte ceilings, administered out of band; 0 = unlimited
CREATE TABLE IF NOT EXISTS db_quotas (
    database_id INTEGER PRIMARY KEY REFERENCES databases(database_id) ON DELETE CASCADE,
    soft_bytes INTEGER NOT NULL DEFAULT 0,
    hard_bytes INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_db_owners_account ON db_owners(account_id);
"#;
