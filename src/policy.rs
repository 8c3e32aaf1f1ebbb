use std::collections::HashSet;

use crate::error::{Error, Result};

/// Decides whether an acting principal may operate on a target principal's
/// resources.
///
/// Two rules, checked in order: an actor always controls their own
/// resources, and some targets (shared infrastructure accounts) accept any
/// actor. The policy is pure; callers guard every mutating operation with
/// [`AccessPolicy::authorize`] before reading or writing any state.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    open_targets: HashSet<String>,
}

impl AccessPolicy {
    pub fn new<I, S>(open_targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            open_targets: open_targets.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_authorized(&self, actor: &str, target: &str) -> bool {
        actor == target || self.open_targets.contains(target)
    }

    /// Guard form of [`AccessPolicy::is_authorized`].
    pub fn authorize(&self, actor: &str, target: &str) -> Result<()> {
        if self.is_authorized(actor, target) {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::new(["sql"])
    }

    #[test]
    fn test_actor_controls_own_resources() {
        assert!(policy().is_authorized("alice", "alice"));
    }

    #[test]
    fn test_actor_cannot_touch_other_accounts() {
        assert!(!policy().is_authorized("alice", "bob"));
    }

    #[test]
    fn test_open_targets_accept_any_actor() {
        assert!(policy().is_authorized("alice", "sql"));
        assert!(policy().is_authorized("bob", "sql"));
    }

    #[test]
    fn test_open_target_list_is_not_an_actor_allowlist() {
        // Being an open target grants nothing when acting on others.
        assert!(!policy().is_authorized("sql", "alice"));
    }

    #[test]
    fn test_authorize_returns_unauthorized() {
        let err = policy().authorize("alice", "bob").unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[test]
    fn test_empty_policy_still_allows_self() {
        let policy = AccessPolicy::new(Vec::<String>::new());
        assert!(policy.is_authorized("alice", "alice"));
        assert!(!policy.is_authorized("alice", "sql"));
    }
}
