use crate::error::{Error, Result};

// MySQL caps user names at 32 characters and schema names at 64.
const MAX_USERNAME_LEN: usize = 32;
const MAX_DATABASE_NAME_LEN: usize = 64;

fn is_valid_name_char(c: char, allow_plus: bool) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || (allow_plus && c == '+')
}

fn validate_name(name: &str, entity: &str, max_len: usize, allow_plus: bool) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName(format!("{entity} cannot be empty")));
    }
    if name.len() > max_len {
        return Err(Error::InvalidName(format!(
            "{entity} cannot exceed {max_len} characters"
        )));
    }
    if !name.chars().all(|c| is_valid_name_char(c, allow_plus)) {
        let allowed = if allow_plus {
            "alphanumeric characters, hyphens, underscores, and plus signs"
        } else {
            "alphanumeric characters, hyphens, and underscores"
        };
        return Err(Error::InvalidName(format!(
            "{entity} can only contain {allowed}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_username(username: &str) -> Result<()> {
    validate_name(username, "username", MAX_USERNAME_LEN, false)
}

/// Validates the local part and the full `<owner>+<local>` form it will
/// produce; the composed name is what the engine's length limit applies to.
pub(crate) fn validate_database_name(owner: &str, local: &str) -> Result<()> {
    validate_name(local, "database name", MAX_DATABASE_NAME_LEN, true)?;
    if owner.len() + 1 + local.len() > MAX_DATABASE_NAME_LEN {
        return Err(Error::InvalidName(format!(
            "full database name exceeds {MAX_DATABASE_NAME_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("web_team-2").is_ok());
    }

    #[test]
    fn test_username_rejects_empty_and_oversized() {
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_username_rejects_separators_and_quotes() {
        assert!(validate_username("alice+web").is_err());
        assert!(validate_username("a'lice").is_err());
        assert!(validate_username("al ice").is_err());
    }

    #[test]
    fn test_valid_database_names() {
        assert!(validate_database_name("alice", "web").is_ok());
        assert!(validate_database_name("alice", "web+staging").is_ok());
    }

    #[test]
    fn test_database_name_rejects_bad_symbols() {
        assert!(validate_database_name("alice", "").is_err());
        assert!(validate_database_name("alice", "we.b").is_err());
        assert!(validate_database_name("alice", "we`b").is_err());
    }

    #[test]
    fn test_full_name_length_budget_includes_owner() {
        // 5 (owner) + 1 (separator) + 58 = 64, exactly at the limit.
        assert!(validate_database_name("alice", &"d".repeat(58)).is_ok());
        assert!(validate_database_name("alice", &"d".repeat(59)).is_err());
    }
}
