//! Rotation engine implementing the single-use refresh token lifecycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::security_event::{SecurityEvent, SecurityEventType};
use crate::domain::entities::token::{RefreshToken, TokenStatus};
use crate::domain::value_objects::{BindingContext, IssuedToken};
use crate::errors::{RotationError, RotationResult};
use crate::repositories::{NoOpSecurityEventRepository, SecurityEventRepository, TokenRepository};
use crate::services::clock::Clock;
use crate::services::codec::{RefreshClaims, TokenCodec};

use super::config::{ContextMismatchPolicy, RotationConfig};

/// Engine for issuing, rotating, and revoking refresh tokens
///
/// Every successful rotation consumes the presented token and issues a
/// successor in the same family; any later presentation of a consumed
/// token revokes the whole family. The conditional status transition in
/// the store is the only synchronization point, so concurrent rotations
/// of one token resolve to exactly one winner.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use tw_core::domain::value_objects::BindingContext;
/// use tw_core::repositories::InMemoryTokenStore;
/// use tw_core::services::clock::SystemClock;
/// use tw_core::services::codec::JwtTokenCodec;
/// use tw_core::services::rotation::{RotationConfig, RotationEngine};
/// use tw_shared::config::TokenConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(InMemoryTokenStore::new());
/// let codec = Arc::new(JwtTokenCodec::new(&TokenConfig::new("secret"))?);
/// let clock = Arc::new(SystemClock);
/// let engine = RotationEngine::new(store, codec, clock, RotationConfig::default())?;
///
/// let context = BindingContext::new("203.0.113.7", "app/1.4.2");
/// let grant = engine.issue(42, &context).await?;
/// let next = engine.rotate(&grant.refresh_token, &context).await?;
/// println!("Rotated into {}", next.token_id);
/// # Ok(())
/// # }
/// ```
pub struct RotationEngine<S, C, K, E = NoOpSecurityEventRepository>
where
    S: TokenRepository,
    C: TokenCodec,
    K: Clock,
    E: SecurityEventRepository + 'static,
{
    /// Store holding the token records
    store: Arc<S>,
    /// Codec between records and their signed wire form
    codec: Arc<C>,
    /// Time source for every expiry and transition decision
    clock: Arc<K>,
    /// Optional security event sink
    events: Option<Arc<E>>,
    /// Engine configuration
    config: RotationConfig,
}

impl<S, C, K> RotationEngine<S, C, K>
where
    S: TokenRepository,
    C: TokenCodec,
    K: Clock,
{
    /// Creates an engine without a security event sink
    ///
    /// # Arguments
    ///
    /// * `store` - Token record persistence
    /// * `codec` - Codec for the signed wire form
    /// * `clock` - Time source
    /// * `config` - Engine configuration; the TTL must be positive
    pub fn new(
        store: Arc<S>,
        codec: Arc<C>,
        clock: Arc<K>,
        config: RotationConfig,
    ) -> Result<Self, RotationError> {
        config.validate()?;
        Ok(Self {
            store,
            codec,
            clock,
            events: None,
            config,
        })
    }
}

impl<S, C, K, E> RotationEngine<S, C, K, E>
where
    S: TokenRepository,
    C: TokenCodec,
    K: Clock,
    E: SecurityEventRepository + 'static,
{
    /// Creates an engine that records security events to the given sink
    ///
    /// Recording is best-effort: a failed write is logged and never
    /// affects the outcome of the operation that produced the event.
    pub fn with_event_log(
        store: Arc<S>,
        codec: Arc<C>,
        clock: Arc<K>,
        events: Arc<E>,
        config: RotationConfig,
    ) -> Result<Self, RotationError> {
        config.validate()?;
        Ok(Self {
            store,
            codec,
            clock,
            events: Some(events),
            config,
        })
    }

    /// Issues the root token of a brand-new family
    ///
    /// # Arguments
    ///
    /// * `user_id` - The authenticated user the token belongs to
    /// * `context` - Client context the token is bound to
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedToken)` - The signed token and its metadata
    /// * `Err(RotationError)` - Validation, encoding, or store failure
    pub async fn issue(&self, user_id: i64, context: &BindingContext) -> RotationResult<IssuedToken> {
        if !context.is_complete() {
            return Err(RotationError::Validation {
                field: "context".to_string(),
            });
        }

        let now = self.clock.now();
        let token = RefreshToken::issue(user_id, context.fingerprint(), now, self.config.refresh_ttl);
        let signed = self
            .codec
            .encode(&token)
            .map_err(|e| RotationError::Internal {
                message: format!("Failed to encode refresh token: {}", e),
            })?;

        let stored = self.store.insert(token).await?;

        self.record_event(
            SecurityEvent::new(SecurityEventType::TokenIssued, user_id, now)
                .with_token(stored.token_id.clone())
                .with_family(stored.family_id.clone())
                .with_context(context.fingerprint()),
        )
        .await;

        Ok(IssuedToken::from_record(&stored, signed, now))
    }

    /// Rotates a presented refresh token into its successor
    ///
    /// This method:
    /// 1. Validates the presented input
    /// 2. Verifies the token's signature and claims
    /// 3. Loads the stored record
    /// 4. Detects replays of consumed or revoked tokens
    /// 5. Retires expired tokens
    /// 6. Enforces the context binding per configured policy
    /// 7. Consumes the token and issues its successor
    ///
    /// # Arguments
    ///
    /// * `raw_token` - The refresh token as presented by the client
    /// * `context` - Client context presented with the request
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedToken)` - The successor token
    /// * `Err(RotationError)` - Why the rotation was refused
    pub async fn rotate(
        &self,
        raw_token: &str,
        context: &BindingContext,
    ) -> RotationResult<IssuedToken> {
        // Step 1: Reject structurally empty input before touching anything
        if raw_token.trim().is_empty() {
            return Err(RotationError::Validation {
                field: "refresh_token".to_string(),
            });
        }
        if !context.is_complete() {
            return Err(RotationError::Validation {
                field: "context".to_string(),
            });
        }

        // Step 2: Verify signature and structure. Expiry is judged later
        // against the stored record, not the claims.
        let (user_id, claims) = self.decode_presented(raw_token)?;

        // Step 3: Load the stored record for the verified token ID
        let saved = self
            .store
            .find(user_id, &claims.jti)
            .await?
            .ok_or(RotationError::NotFound)?;

        let now = self.clock.now();

        // Step 4: A terminal record presented again is a replay; the
        // whole family is burned
        if !saved.is_active() {
            self.handle_reuse(&saved, context, now).await?;
            return Err(RotationError::ReuseDetected);
        }

        // Step 5: Expired tokens are retired on sight. The transition
        // result is ignored; a concurrent consumer leaves the record
        // terminal either way.
        if saved.is_expired_at(now) {
            let _ = self
                .store
                .transition_status(
                    user_id,
                    &saved.token_id,
                    TokenStatus::Active,
                    TokenStatus::Revoked,
                    now,
                )
                .await?;
            self.record_event(
                SecurityEvent::new(SecurityEventType::ExpiredTokenPresented, user_id, now)
                    .with_token(saved.token_id.clone())
                    .with_family(saved.family_id.clone()),
            )
            .await;
            return Err(RotationError::Expired);
        }

        // Step 6: Enforce the context binding per configured policy
        if !context.matches_fingerprint(&saved.bound_context) {
            match self.config.mismatch_policy {
                ContextMismatchPolicy::Strict => {
                    warn!(
                        "Context mismatch for user {} family {}: revoking family (strict policy)",
                        user_id, saved.family_id
                    );
                    let revoked = self
                        .store
                        .revoke_family(user_id, &saved.family_id, now)
                        .await?;
                    self.record_event(
                        SecurityEvent::new(SecurityEventType::ContextMismatch, user_id, now)
                            .with_token(saved.token_id.clone())
                            .with_family(saved.family_id.clone())
                            .with_context(context.fingerprint())
                            .with_detail(json!({ "policy": "strict", "revoked": revoked })),
                    )
                    .await;
                    return Err(RotationError::ContextMismatch);
                }
                ContextMismatchPolicy::Reject => {
                    warn!(
                        "Context mismatch for user {} family {}: rotation refused",
                        user_id, saved.family_id
                    );
                    self.record_event(
                        SecurityEvent::new(SecurityEventType::ContextMismatch, user_id, now)
                            .with_token(saved.token_id.clone())
                            .with_family(saved.family_id.clone())
                            .with_context(context.fingerprint())
                            .with_detail(json!({ "policy": "reject" })),
                    )
                    .await;
                    return Err(RotationError::ContextMismatch);
                }
                ContextMismatchPolicy::Lenient => {
                    warn!(
                        "Context mismatch for user {} family {}: allowed by lenient policy",
                        user_id, saved.family_id
                    );
                    self.record_event(
                        SecurityEvent::new(SecurityEventType::ContextMismatch, user_id, now)
                            .with_token(saved.token_id.clone())
                            .with_family(saved.family_id.clone())
                            .with_context(context.fingerprint())
                            .with_detail(json!({ "policy": "lenient" })),
                    )
                    .await;
                }
            }
        }

        // Step 7: Mint the successor, then take the consuming transition.
        // Whoever wins the compare-and-swap owns the rotation; everyone
        // else is treated as a replay.
        let successor =
            RefreshToken::successor_of(&saved, context.fingerprint(), now, self.config.refresh_ttl);
        let signed = self
            .codec
            .encode(&successor)
            .map_err(|e| RotationError::Internal {
                message: format!("Failed to encode successor token: {}", e),
            })?;

        let won = self
            .store
            .transition_status(
                user_id,
                &saved.token_id,
                TokenStatus::Active,
                TokenStatus::Rotated,
                now,
            )
            .await?;

        if !won {
            self.handle_reuse(&saved, context, now).await?;
            return Err(RotationError::ReuseDetected);
        }

        let stored = self.store.insert(successor).await?;

        self.record_event(
            SecurityEvent::new(SecurityEventType::TokenRotated, user_id, now)
                .with_token(stored.token_id.clone())
                .with_family(stored.family_id.clone())
                .with_detail(json!({ "parent": saved.token_id })),
        )
        .await;

        Ok(IssuedToken::from_record(&stored, signed, now))
    }

    /// Revokes a single presented token
    ///
    /// The cascade is deliberately not triggered here: revoking your own
    /// token is an ordinary logout, not a threat signal.
    ///
    /// # Arguments
    ///
    /// * `raw_token` - The refresh token as presented by the client
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The token was active and is now revoked
    /// * `Ok(false)` - The token was unknown or already terminal
    /// * `Err(RotationError)` - Input or store failure
    pub async fn revoke(&self, raw_token: &str) -> RotationResult<bool> {
        if raw_token.trim().is_empty() {
            return Err(RotationError::Validation {
                field: "refresh_token".to_string(),
            });
        }

        let (user_id, claims) = self.decode_presented(raw_token)?;

        let now = self.clock.now();
        let revoked = self
            .store
            .transition_status(
                user_id,
                &claims.jti,
                TokenStatus::Active,
                TokenStatus::Revoked,
                now,
            )
            .await?;

        if revoked {
            self.record_event(
                SecurityEvent::new(SecurityEventType::TokenRevoked, user_id, now)
                    .with_token(claims.jti.clone())
                    .with_family(claims.fam.clone()),
            )
            .await;
        }

        Ok(revoked)
    }

    /// Revokes every active token the user holds, across all families
    ///
    /// Logout-everywhere and the first response to a compromised account.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user whose sessions end
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of tokens revoked
    /// * `Err(RotationError)` - Store failure
    pub async fn revoke_all_for_user(&self, user_id: i64) -> RotationResult<usize> {
        let now = self.clock.now();
        let revoked = self.store.revoke_all_for_user(user_id, now).await?;

        info!("Revoked {} active tokens for user {}", revoked, user_id);
        self.record_event(
            SecurityEvent::new(SecurityEventType::FamilyRevoked, user_id, now)
                .with_detail(json!({ "revoked": revoked, "scope": "user" })),
        )
        .await;

        Ok(revoked)
    }

    /// Verifies a presented token string and extracts the claim identity
    fn decode_presented(&self, raw_token: &str) -> RotationResult<(i64, RefreshClaims)> {
        let claims = match self.codec.decode(raw_token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Refresh token failed verification: {}", e);
                return Err(RotationError::InvalidToken);
            }
        };

        let user_id = match claims.user_id() {
            Ok(user_id) => user_id,
            Err(e) => {
                debug!("Refresh token carried unusable claims: {}", e);
                return Err(RotationError::InvalidToken);
            }
        };

        Ok((user_id, claims))
    }

    /// Burns the family after a replayed or raced presentation
    async fn handle_reuse(
        &self,
        saved: &RefreshToken,
        context: &BindingContext,
        now: DateTime<Utc>,
    ) -> RotationResult<()> {
        warn!(
            "Refresh token reuse detected for user {} family {}: revoking family",
            saved.user_id, saved.family_id
        );

        let revoked = self
            .store
            .revoke_family(saved.user_id, &saved.family_id, now)
            .await?;

        self.record_event(
            SecurityEvent::new(SecurityEventType::ReuseDetected, saved.user_id, now)
                .with_token(saved.token_id.clone())
                .with_family(saved.family_id.clone())
                .with_context(context.fingerprint())
                .with_detail(json!({ "revoked": revoked })),
        )
        .await;

        Ok(())
    }

    /// Records a security event without letting a sink failure affect the call
    async fn record_event(&self, event: SecurityEvent) {
        if let Some(ref events) = self.events {
            if let Err(e) = events.record(&event).await {
                warn!(
                    "Failed to record {} event: {}",
                    event.event_type.as_str(),
                    e
                );
            }
        }
    }
}
