//! Payload shaping for the command surface.
//!
//! Every invocation prints exactly one JSON object on stdout. Success
//! payloads carry the few fields an operation produces (often none).
//! Refusals become a failure payload with the human-readable reason and,
//! for name conflicts, the layer that detected the collision. Internal
//! errors never get a payload; the caller sees a diagnostic on stderr and a
//! distinct exit status instead.

use serde::Serialize;

use crate::error::{ConflictLayer, Error};

/// Payload for operations that issue a credential. The plaintext appears
/// here and nowhere else; the registry keeps only the encoded form.
#[derive(Debug, Serialize)]
pub struct IssuedPassword {
    pub password: String,
}

/// Payload for a successful database creation, carrying the full name the
/// owner connects to.
#[derive(Debug, Serialize)]
pub struct CreatedDatabase {
    pub database: String,
}

/// Failure payload for refusals the caller can act on.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub error: String,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub layer: Option<ConflictLayer>,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        let layer = match err {
            Error::AlreadyExists { layer, .. } => Some(*layer),
            _ => None,
        };
        Self {
            error: err.to_string(),
            layer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuotaBreach;

    #[test]
    fn test_issued_password_payload() {
        let payload = IssuedPassword {
            password: "s3cret!".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"password": "s3cret!"})
        );
    }

    #[test]
    fn test_failure_payload_omits_layer_by_default() {
        let err = Error::NotFound("account alice".to_string());
        assert_eq!(
            serde_json::to_value(Failure::from(&err)).unwrap(),
            serde_json::json!({"error": "account alice not found"})
        );
    }

    #[test]
    fn test_conflict_payload_names_the_layer() {
        let err = Error::AlreadyExists {
            layer: ConflictLayer::Sql,
            name: "alice+web".to_string(),
        };
        assert_eq!(
            serde_json::to_value(Failure::from(&err)).unwrap(),
            serde_json::json!({"error": "alice+web already exists", "where": "sql"})
        );
    }

    #[test]
    fn test_quota_breach_message_carries_numbers() {
        let err = Error::QuotaExceeded(QuotaBreach::Databases { used: 5, limit: 5 });
        let failure = Failure::from(&err);
        assert_eq!(
            failure.error,
            "database quota exceeded: 5 of 5 enabled databases in use"
        );
    }
}
