//! Refresh token entity and its lifecycle state machine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default refresh token expiration time (7 days)
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Lifecycle state of a refresh token
///
/// A token starts `Active` and takes exactly one transition:
/// `Active -> Rotated` when consumed by a successful rotation, or
/// `Active -> Revoked` when invalidated. Both outcomes are terminal;
/// a terminal token never becomes `Active` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    /// Token can be presented for rotation
    Active,
    /// Token was consumed by a successful rotation
    Rotated,
    /// Token was invalidated (expiry, logout, or cascade)
    Revoked,
}

impl TokenStatus {
    /// Returns the storage representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Active => "active",
            TokenStatus::Rotated => "rotated",
            TokenStatus::Revoked => "revoked",
        }
    }

    /// Checks whether the status is terminal
    ///
    /// # Returns
    ///
    /// `true` for `Rotated` and `Revoked`, `false` for `Active`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TokenStatus::Active)
    }
}

impl std::fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TokenStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TokenStatus::Active),
            "rotated" => Ok(TokenStatus::Rotated),
            "revoked" => Ok(TokenStatus::Revoked),
            _ => Err(format!("Invalid token status: {}", s)),
        }
    }
}

/// Refresh token record as held by the token store
///
/// One record per issued token. Rotation never deletes records; consumed
/// and revoked tokens stay behind as family lineage so that a replayed
/// old token can still be recognized. The retention sweeper prunes
/// terminal records well after expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Globally unique token identifier (the `jti` claim)
    pub token_id: String,

    /// User ID this token belongs to
    pub user_id: i64,

    /// Lineage identifier shared by a root token and all its successors
    pub family_id: String,

    /// Token ID of the consumed predecessor, `None` for a family root
    pub parent_token_id: Option<String>,

    /// Timestamp when the token was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Fingerprint of the client context the token is bound to
    pub bound_context: String,

    /// Current lifecycle state
    pub status: TokenStatus,

    /// Timestamp of the transition out of `Active`, if any
    pub status_changed_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Creates the root token of a new family
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owning user's ID
    /// * `bound_context` - Fingerprint of the requesting client context
    /// * `now` - Issuance instant
    /// * `ttl` - Token lifetime; must be positive
    ///
    /// # Returns
    ///
    /// A new `Active` `RefreshToken` with fresh token and family IDs
    pub fn issue(user_id: i64, bound_context: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token_id: Uuid::new_v4().to_string(),
            user_id,
            family_id: Uuid::new_v4().to_string(),
            parent_token_id: None,
            issued_at: now,
            expires_at: now + ttl,
            bound_context,
            status: TokenStatus::Active,
            status_changed_at: None,
        }
    }

    /// Creates the successor of a consumed token within the same family
    ///
    /// # Arguments
    ///
    /// * `parent` - The token being consumed by rotation
    /// * `bound_context` - Fingerprint of the context presented at rotation
    /// * `now` - Issuance instant
    /// * `ttl` - Lifetime of the successor; must be positive
    ///
    /// # Returns
    ///
    /// A new `Active` `RefreshToken` sharing the parent's user and family
    pub fn successor_of(
        parent: &RefreshToken,
        bound_context: String,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            token_id: Uuid::new_v4().to_string(),
            user_id: parent.user_id,
            family_id: parent.family_id.clone(),
            parent_token_id: Some(parent.token_id.clone()),
            issued_at: now,
            expires_at: now + ttl,
            bound_context,
            status: TokenStatus::Active,
            status_changed_at: None,
        }
    }

    /// Checks if the token has expired at the given instant
    ///
    /// Expiry is exclusive: a token presented exactly at `expires_at`
    /// is still alive.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Checks if the token can still be presented for rotation
    pub fn is_active(&self) -> bool {
        self.status == TokenStatus::Active
    }

    /// Marks the token as consumed by a successful rotation
    pub fn mark_rotated(&mut self, at: DateTime<Utc>) {
        self.status = TokenStatus::Rotated;
        self.status_changed_at = Some(at);
    }

    /// Marks the token as revoked
    pub fn mark_revoked(&mut self, at: DateTime<Utc>) {
        self.status = TokenStatus::Revoked;
        self.status_changed_at = Some(at);
    }

    /// Remaining lifetime at the given instant
    ///
    /// # Returns
    ///
    /// A `Duration` until expiration, or zero if already expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_status_round_trip() {
        for status in [TokenStatus::Active, TokenStatus::Rotated, TokenStatus::Revoked] {
            let parsed: TokenStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("disabled".parse::<TokenStatus>().is_err());
    }

    #[test]
    fn test_status_terminality() {
        assert!(!TokenStatus::Active.is_terminal());
        assert!(TokenStatus::Rotated.is_terminal());
        assert!(TokenStatus::Revoked.is_terminal());
    }

    #[test]
    fn test_issue_creates_family_root() {
        let now = fixed_now();
        let token = RefreshToken::issue(42, "ctx-fingerprint".to_string(), now, Duration::days(7));

        assert_eq!(token.user_id, 42);
        assert_eq!(token.parent_token_id, None);
        assert_eq!(token.issued_at, now);
        assert_eq!(token.expires_at, now + Duration::days(7));
        assert!(token.is_active());
        assert!(token.status_changed_at.is_none());
    }

    #[test]
    fn test_issue_generates_distinct_ids() {
        let now = fixed_now();
        let a = RefreshToken::issue(1, "ctx".to_string(), now, Duration::days(7));
        let b = RefreshToken::issue(1, "ctx".to_string(), now, Duration::days(7));

        assert_ne!(a.token_id, b.token_id);
        assert_ne!(a.family_id, b.family_id);
    }

    #[test]
    fn test_successor_inherits_family() {
        let now = fixed_now();
        let parent = RefreshToken::issue(7, "ctx-a".to_string(), now, Duration::days(7));
        let child =
            RefreshToken::successor_of(&parent, "ctx-b".to_string(), now, Duration::days(7));

        assert_eq!(child.user_id, parent.user_id);
        assert_eq!(child.family_id, parent.family_id);
        assert_eq!(child.parent_token_id.as_deref(), Some(parent.token_id.as_str()));
        assert_ne!(child.token_id, parent.token_id);
        assert!(child.is_active());
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = fixed_now();
        let token = RefreshToken::issue(1, "ctx".to_string(), now, Duration::days(7));

        assert!(!token.is_expired_at(token.expires_at));
        assert!(token.is_expired_at(token.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_mark_rotated_stamps_transition() {
        let now = fixed_now();
        let mut token = RefreshToken::issue(1, "ctx".to_string(), now, Duration::days(7));
        let later = now + Duration::hours(1);

        token.mark_rotated(later);

        assert_eq!(token.status, TokenStatus::Rotated);
        assert_eq!(token.status_changed_at, Some(later));
        assert!(!token.is_active());
    }

    #[test]
    fn test_mark_revoked_stamps_transition() {
        let now = fixed_now();
        let mut token = RefreshToken::issue(1, "ctx".to_string(), now, Duration::days(7));

        token.mark_revoked(now);

        assert_eq!(token.status, TokenStatus::Revoked);
        assert_eq!(token.status_changed_at, Some(now));
    }

    #[test]
    fn test_time_until_expiration() {
        let now = fixed_now();
        let token = RefreshToken::issue(1, "ctx".to_string(), now, Duration::days(7));

        assert_eq!(token.time_until_expiration(now), Duration::days(7));
        assert_eq!(
            token.time_until_expiration(now + Duration::days(10)),
            Duration::zero()
        );
    }

    #[test]
    fn test_refresh_token_serialization() {
        let token = RefreshToken::issue(9, "ctx".to_string(), fixed_now(), Duration::days(7));

        let json = serde_json::to_string(&token).unwrap();
        let deserialized: RefreshToken = serde_json::from_str(&json).unwrap();

        assert_eq!(token, deserialized);
        assert!(json.contains("\"active\""));
    }
}
