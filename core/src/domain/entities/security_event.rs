//! Security event entity for recording token lifecycle and threat signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Event types emitted by the rotation engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventType {
    // Lifecycle events
    TokenIssued,
    TokenRotated,
    TokenRevoked,
    FamilyRevoked,

    // Threat signals
    ReuseDetected,
    ContextMismatch,
    ExpiredTokenPresented,
}

impl SecurityEventType {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenIssued => "TOKEN_ISSUED",
            Self::TokenRotated => "TOKEN_ROTATED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::FamilyRevoked => "FAMILY_REVOKED",
            Self::ReuseDetected => "REUSE_DETECTED",
            Self::ContextMismatch => "CONTEXT_MISMATCH",
            Self::ExpiredTokenPresented => "EXPIRED_TOKEN_PRESENTED",
        }
    }

    /// Parse from string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "TOKEN_ISSUED" => Some(Self::TokenIssued),
            "TOKEN_ROTATED" => Some(Self::TokenRotated),
            "TOKEN_REVOKED" => Some(Self::TokenRevoked),
            "FAMILY_REVOKED" => Some(Self::FamilyRevoked),
            "REUSE_DETECTED" => Some(Self::ReuseDetected),
            "CONTEXT_MISMATCH" => Some(Self::ContextMismatch),
            "EXPIRED_TOKEN_PRESENTED" => Some(Self::ExpiredTokenPresented),
            _ => None,
        }
    }

    /// Whether this event type should page a human
    ///
    /// Reuse detection is the one signal that indicates an actual replay
    /// of a consumed credential rather than ordinary client behavior.
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::ReuseDetected)
    }
}

/// A single security event recorded around the token lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityEvent {
    /// Unique identifier for the event
    pub id: Uuid,

    /// Type of event
    pub event_type: SecurityEventType,

    /// User the event concerns
    pub user_id: i64,

    /// Token ID for token-scoped events
    pub token_id: Option<String>,

    /// Family ID for family-scoped events
    pub family_id: Option<String>,

    /// Fingerprint of the client context presented with the request
    pub context_fingerprint: Option<String>,

    /// Additional event data in JSON format
    pub detail: Option<JsonValue>,

    /// Timestamp when the event occurred
    pub created_at: DateTime<Utc>,
}

impl SecurityEvent {
    /// Create a new security event
    pub fn new(event_type: SecurityEventType, user_id: i64, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            user_id,
            token_id: None,
            family_id: None,
            context_fingerprint: None,
            detail: None,
            created_at: at,
        }
    }

    /// Add the token this event concerns
    pub fn with_token(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    /// Add the family this event concerns
    pub fn with_family(mut self, family_id: impl Into<String>) -> Self {
        self.family_id = Some(family_id.into());
        self
    }

    /// Add the presented context fingerprint
    pub fn with_context(mut self, fingerprint: impl Into<String>) -> Self {
        self.context_fingerprint = Some(fingerprint.into());
        self
    }

    /// Add event data as JSON
    pub fn with_detail(mut self, detail: JsonValue) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Whether this event should page a human
    pub fn is_alert(&self) -> bool {
        self.event_type.is_alert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_round_trip() {
        let all = [
            SecurityEventType::TokenIssued,
            SecurityEventType::TokenRotated,
            SecurityEventType::TokenRevoked,
            SecurityEventType::FamilyRevoked,
            SecurityEventType::ReuseDetected,
            SecurityEventType::ContextMismatch,
            SecurityEventType::ExpiredTokenPresented,
        ];
        for event_type in all {
            assert_eq!(SecurityEventType::from_str(event_type.as_str()), Some(event_type));
        }
        assert_eq!(SecurityEventType::from_str("UNKNOWN_EVENT"), None);
    }

    #[test]
    fn test_only_reuse_is_alert() {
        assert!(SecurityEventType::ReuseDetected.is_alert());
        assert!(!SecurityEventType::TokenRotated.is_alert());
        assert!(!SecurityEventType::ContextMismatch.is_alert());
    }

    #[test]
    fn test_event_builder() {
        let at = Utc::now();
        let event = SecurityEvent::new(SecurityEventType::ReuseDetected, 42, at)
            .with_token("tok-1")
            .with_family("fam-1")
            .with_context("fingerprint")
            .with_detail(serde_json::json!({ "revoked": 3 }));

        assert_eq!(event.user_id, 42);
        assert_eq!(event.token_id.as_deref(), Some("tok-1"));
        assert_eq!(event.family_id.as_deref(), Some("fam-1"));
        assert_eq!(event.created_at, at);
        assert!(event.is_alert());
    }
}
