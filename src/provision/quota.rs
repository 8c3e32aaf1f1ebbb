use crate::error::QuotaBreach;
use crate::types::{AccountQuota, UsageStat};

/// Point-in-time view of everything the database-creation check compares.
#[derive(Debug, Clone, Copy)]
pub struct QuotaSnapshot {
    pub enabled_databases: i64,
    pub max_databases: i64,
    pub bytes_used: i64,
    pub max_bytes: i64,
}

impl QuotaSnapshot {
    #[must_use]
    pub fn new(enabled_databases: i64, quota: &AccountQuota, usage: &UsageStat) -> Self {
        Self {
            enabled_databases,
            max_databases: quota.max_databases,
            bytes_used: usage.bytes_used,
            max_bytes: quota.max_bytes,
        }
    }

    /// Checks whether one more database fits, database ceiling first.
    ///
    /// The database count must stay at or under the ceiling after the
    /// creation, so a snapshot already at the ceiling fails. Byte usage only
    /// has to be within the ceiling now; a new empty database adds nothing,
    /// and growth is the usage collector's problem. This check is advisory
    /// for the count (the registry re-counts inside the insert transaction)
    /// and authoritative for bytes.
    pub fn admits_creation(&self) -> Result<(), QuotaBreach> {
        if self.enabled_databases >= self.max_databases {
            return Err(QuotaBreach::Databases {
                used: self.enabled_databases,
                limit: self.max_databases,
            });
        }
        if self.bytes_used > self.max_bytes {
            return Err(QuotaBreach::Bytes {
                used: self.bytes_used,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(enabled: i64, max_dbs: i64, used: i64, max_bytes: i64) -> QuotaSnapshot {
        QuotaSnapshot {
            enabled_databases: enabled,
            max_databases: max_dbs,
            bytes_used: used,
            max_bytes,
        }
    }

    #[test]
    fn test_admits_under_both_ceilings() {
        assert!(snapshot(3, 20, 1024, 4096).admits_creation().is_ok());
    }

    #[test]
    fn test_refuses_at_database_ceiling() {
        let err = snapshot(5, 5, 0, 4096).admits_creation().unwrap_err();
        assert_eq!(err, QuotaBreach::Databases { used: 5, limit: 5 });
    }

    #[test]
    fn test_bytes_at_ceiling_still_admit() {
        // The invariant is bytes_used <= max_bytes; equality holds it.
        assert!(snapshot(0, 20, 4096, 4096).admits_creation().is_ok());
    }

    #[test]
    fn test_refuses_over_byte_ceiling() {
        let err = snapshot(0, 20, 4097, 4096).admits_creation().unwrap_err();
        assert_eq!(err, QuotaBreach::Bytes { used: 4097, limit: 4096 });
    }

    #[test]
    fn test_database_ceiling_reported_before_bytes() {
        let err = snapshot(5, 5, 9999, 4096).admits_creation().unwrap_err();
        assert!(matches!(err, QuotaBreach::Databases { .. }));
    }

    #[test]
    fn test_zero_ceiling_admits_nothing() {
        let err = snapshot(0, 0, 0, 4096).admits_creation().unwrap_err();
        assert_eq!(err, QuotaBreach::Databases { used: 0, limit: 0 });
    }
}
