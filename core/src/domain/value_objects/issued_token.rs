//! Issued token value object returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::token::RefreshToken;

/// The grant handed back after a successful issue or rotation
///
/// Carries the signed bearer string plus enough metadata for the caller
/// to schedule its next rotation. The raw bearer string exists only
/// here; the store keeps fingerprints and identifiers, never the
/// credential itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuedToken {
    /// Signed refresh token for the client to hold
    pub refresh_token: String,

    /// Identifier of the issued token
    pub token_id: String,

    /// Family lineage the token belongs to
    pub family_id: String,

    /// Seconds until expiration, measured at issuance
    pub expires_in: i64,

    /// Absolute expiration timestamp
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Creates an issued token from a stored record and its signed form
    ///
    /// # Arguments
    ///
    /// * `record` - The persisted refresh token record
    /// * `signed` - The encoded bearer string for that record
    /// * `now` - Instant the grant is produced, for the relative expiry
    pub fn from_record(record: &RefreshToken, signed: String, now: DateTime<Utc>) -> Self {
        Self {
            refresh_token: signed,
            token_id: record.token_id.clone(),
            family_id: record.family_id.clone(),
            expires_in: record.time_until_expiration(now).num_seconds(),
            expires_at: record.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_from_record() {
        let now = Utc::now();
        let record = RefreshToken::issue(5, "ctx".to_string(), now, Duration::days(7));
        let issued = IssuedToken::from_record(&record, "signed.jwt.value".to_string(), now);

        assert_eq!(issued.refresh_token, "signed.jwt.value");
        assert_eq!(issued.token_id, record.token_id);
        assert_eq!(issued.family_id, record.family_id);
        assert_eq!(issued.expires_in, 7 * 24 * 60 * 60);
        assert_eq!(issued.expires_at, record.expires_at);
    }
}
