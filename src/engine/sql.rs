//! Statement rendering for the administrative primitives.
//!
//! MySQL does not take placeholders for identifiers or user specifications
//! in DDL, so every value is rendered inline: identifiers quoted with
//! backticks, string literals single-quoted with quote and backslash
//! escaping. Generated passwords and validated names are the only inputs.

/// Quotes a schema object name, doubling embedded backticks.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Renders a string literal, escaping single quotes and backslashes.
pub(crate) fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// The `'user'@'host'` form shared by every login-addressed statement.
fn login(username: &str, host: &str) -> String {
    format!("{}@{}", quote_literal(username), quote_literal(host))
}

pub(crate) fn create_login(username: &str, host: &str, password: &str) -> String {
    format!(
        "CREATE USER {} IDENTIFIED BY {}",
        login(username, host),
        quote_literal(password)
    )
}

pub(crate) fn drop_login(username: &str, host: &str) -> String {
    format!("DROP USER {}", login(username, host))
}

pub(crate) fn change_password(username: &str, host: &str, password: &str) -> String {
    format!(
        "ALTER USER {} IDENTIFIED BY {}",
        login(username, host),
        quote_literal(password)
    )
}

pub(crate) fn create_database(name: &str) -> String {
    format!("CREATE DATABASE {}", quote_identifier(name))
}

pub(crate) fn drop_database(name: &str, ignore_missing: bool) -> String {
    if ignore_missing {
        format!("DROP DATABASE IF EXISTS {}", quote_identifier(name))
    } else {
        format!("DROP DATABASE {}", quote_identifier(name))
    }
}

pub(crate) fn grant_all(database: &str, username: &str, host: &str) -> String {
    format!(
        "GRANT ALL PRIVILEGES ON {}.* TO {}",
        quote_identifier(database),
        login(username, host)
    )
}

pub(crate) fn revoke_all(database: &str, username: &str, host: &str) -> String {
    format!(
        "REVOKE ALL PRIVILEGES ON {}.* FROM {}",
        quote_identifier(database),
        login(username, host)
    )
}
