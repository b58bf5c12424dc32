//! Token store trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::token::{RefreshToken, TokenStatus};
use crate::errors::StoreError;

/// Store contract for RefreshToken records
///
/// This trait defines the persistence operations the rotation engine
/// relies on. The single correctness-critical requirement is that
/// `transition_status` is linearizable per `(user_id, token_id)` key:
/// when N callers race the same transition, exactly one observes `true`.
///
/// # Security Considerations
/// - Raw bearer strings are never stored; records carry identifiers and
///   context fingerprints only
/// - Consumed and revoked records must be retained (not deleted) so that
///   replayed tokens can still be recognized
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Insert a newly issued token record
    ///
    /// # Arguments
    /// * `token` - The `Active` record to persist
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The stored record
    /// * `Err(StoreError::DuplicateTokenId)` - A record with the same token ID exists
    /// * `Err(StoreError::Unavailable)` - Store I/O failed
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use tw_core::repositories::TokenRepository;
    /// # use tw_core::domain::entities::token::RefreshToken;
    /// # async fn example(store: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let token = RefreshToken::issue(42, "fingerprint".to_string(), Utc::now(), Duration::days(7));
    ///
    /// let stored = store.insert(token).await?;
    /// println!("Stored token {}", stored.token_id);
    /// # Ok(())
    /// # }
    /// ```
    async fn insert(&self, token: RefreshToken) -> Result<RefreshToken, StoreError>;

    /// Point lookup by the composite key
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    /// * `token_id` - The token identifier from the verified claims
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Record found
    /// * `Ok(None)` - No record under that key
    /// * `Err(StoreError)` - Store I/O failed
    async fn find(&self, user_id: i64, token_id: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Conditionally transition a record's status
    ///
    /// Compare-and-swap on the status column: the record moves to `to`
    /// only if its current status equals `from`, stamping
    /// `status_changed_at` with `at`. This is the engine's sole
    /// synchronization primitive; implementations must make it
    /// linearizable per key.
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    /// * `token_id` - The record to transition
    /// * `from` - Expected current status
    /// * `to` - Target status
    /// * `at` - Transition timestamp
    ///
    /// # Returns
    /// * `Ok(true)` - The record matched `from` and was transitioned
    /// * `Ok(false)` - The record was missing or its status differed
    /// * `Err(StoreError)` - Store I/O failed
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Utc;
    /// # use tw_core::repositories::TokenRepository;
    /// # use tw_core::domain::entities::token::TokenStatus;
    /// # async fn example(store: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let won = store
    ///     .transition_status(42, "token-id", TokenStatus::Active, TokenStatus::Rotated, Utc::now())
    ///     .await?;
    ///
    /// if !won {
    ///     println!("Lost the race: token already consumed");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn transition_status(
        &self,
        user_id: i64,
        token_id: &str,
        from: TokenStatus,
        to: TokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Revoke every active token in a family
    ///
    /// Used for cascade revocation when reuse is detected. Idempotent:
    /// already-terminal rows are left untouched, so calling this twice
    /// has the same effect as calling it once.
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    /// * `family_id` - The lineage to revoke
    /// * `at` - Revocation timestamp
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows moved to `Revoked` by this call
    /// * `Err(StoreError)` - Store I/O failed
    async fn revoke_family(
        &self,
        user_id: i64,
        family_id: &str,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError>;

    /// Revoke every active token belonging to a user
    ///
    /// # Arguments
    /// * `user_id` - The user whose sessions end
    /// * `at` - Revocation timestamp
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows moved to `Revoked`
    /// * `Err(StoreError)` - Store I/O failed
    async fn revoke_all_for_user(&self, user_id: i64, at: DateTime<Utc>)
        -> Result<usize, StoreError>;

    /// List a family's records, newest first
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    /// * `family_id` - The lineage to list
    ///
    /// # Returns
    /// * `Ok(Vec<RefreshToken>)` - All records of the family ordered by issuance, newest first
    /// * `Err(StoreError)` - Store I/O failed
    async fn find_family(
        &self,
        user_id: i64,
        family_id: &str,
    ) -> Result<Vec<RefreshToken>, StoreError>;

    /// Delete records no longer needed for reuse detection
    ///
    /// Prunes rows that expired more than `retention` before `now`.
    /// Recently expired rows are kept: a replayed consumed token must
    /// still be recognizable for the cascade to fire. Called by the
    /// retention sweeper, never by the rotation flow.
    ///
    /// # Arguments
    /// * `now` - Current instant
    /// * `retention` - Grace period after expiry before a row may be deleted
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows deleted
    /// * `Err(StoreError)` - Store I/O failed
    async fn delete_expired(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> Result<usize, StoreError>;

    /// Count the active records in a family
    ///
    /// # Arguments
    /// * `user_id` - The owning user
    /// * `family_id` - The lineage to count
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of `Active` records (0 or 1 for a healthy family)
    /// * `Err(StoreError)` - Store I/O failed
    async fn count_active_in_family(
        &self,
        user_id: i64,
        family_id: &str,
    ) -> Result<usize, StoreError> {
        let family = self.find_family(user_id, family_id).await?;
        Ok(family.iter().filter(|t| t.is_active()).count())
    }
}
