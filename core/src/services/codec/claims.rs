//! Claim set carried inside a signed refresh token.

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::RefreshToken;
use crate::errors::CodecError;

/// Claims embedded in every refresh token
///
/// `sub` carries the user ID in decimal form while `jti` and `fam` tie
/// the token back to its stored record and lineage. Expiry travels in
/// the claims for interoperability, but the stored record is what the
/// engine trusts for lifetime decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject: the owning user's ID as a decimal string
    pub sub: String,

    /// Token identifier, matches the stored record
    pub jti: String,

    /// Family identifier shared across a rotation lineage
    pub fam: String,

    /// Issued-at timestamp (unix seconds)
    pub iat: i64,

    /// Not-before timestamp (unix seconds)
    pub nbf: i64,

    /// Expiry timestamp (unix seconds)
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience, present only when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl RefreshClaims {
    /// Builds the claim set for a stored token record
    pub fn for_token(token: &RefreshToken, issuer: &str, audience: Option<&str>) -> Self {
        Self {
            sub: token.user_id.to_string(),
            jti: token.token_id.clone(),
            fam: token.family_id.clone(),
            iat: token.issued_at.timestamp(),
            nbf: token.issued_at.timestamp(),
            exp: token.expires_at.timestamp(),
            iss: issuer.to_string(),
            aud: audience.map(String::from),
        }
    }

    /// Parses the subject claim back into a user ID
    pub fn user_id(&self) -> Result<i64, CodecError> {
        self.sub.parse::<i64>().map_err(|_| CodecError::InvalidClaims {
            message: format!("subject is not a numeric user id: {}", self.sub),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_for_token_copies_record_identity() {
        let now = Utc::now();
        let record = RefreshToken::issue(42, "ctx".to_string(), now, Duration::days(7));

        let claims = RefreshClaims::for_token(&record, "token-warden", Some("mobile"));

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.jti, record.token_id);
        assert_eq!(claims.fam, record.family_id);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.nbf, now.timestamp());
        assert_eq!(claims.exp, record.expires_at.timestamp());
        assert_eq!(claims.iss, "token-warden");
        assert_eq!(claims.aud.as_deref(), Some("mobile"));
    }

    #[test]
    fn test_user_id_parses_decimal_subject() {
        let record = RefreshToken::issue(9_000_000_001, "ctx".to_string(), Utc::now(), Duration::days(7));
        let claims = RefreshClaims::for_token(&record, "token-warden", None);

        assert_eq!(claims.user_id().unwrap(), 9_000_000_001);
    }

    #[test]
    fn test_user_id_rejects_non_numeric_subject() {
        let record = RefreshToken::issue(1, "ctx".to_string(), Utc::now(), Duration::days(7));
        let mut claims = RefreshClaims::for_token(&record, "token-warden", None);
        claims.sub = "not-a-number".to_string();

        assert!(matches!(claims.user_id(), Err(CodecError::InvalidClaims { .. })));
    }

    #[test]
    fn test_audience_is_omitted_when_unset() {
        let record = RefreshToken::issue(1, "ctx".to_string(), Utc::now(), Duration::days(7));
        let claims = RefreshClaims::for_token(&record, "token-warden", None);

        let value = serde_json::to_value(&claims).unwrap();
        assert!(value.get("aud").is_none());
        assert!(value.get("jti").is_some());
    }
}
