//! In-memory implementation of the token store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::{RefreshToken, TokenStatus};
use crate::errors::StoreError;

use super::r#trait::TokenRepository;

/// Token store backed by a process-local map
///
/// Records are keyed by token ID; `find` additionally checks ownership.
/// Every mutating operation takes the write lock for its whole
/// read-check-write sequence, which makes `transition_status`
/// linearizable per key. Suitable for tests and single-process
/// deployments; multi-process deployments use the SQL store.
pub struct InMemoryTokenStore {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl InMemoryTokenStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenStore {
    async fn insert(&self, token: RefreshToken) -> Result<RefreshToken, StoreError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_id) {
            return Err(StoreError::DuplicateTokenId {
                token_id: token.token_id.clone(),
            });
        }

        tokens.insert(token.token_id.clone(), token.clone());
        Ok(token)
    }

    async fn find(&self, user_id: i64, token_id: &str) -> Result<Option<RefreshToken>, StoreError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .get(token_id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn transition_status(
        &self,
        user_id: i64,
        token_id: &str,
        from: TokenStatus,
        to: TokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        // Terminal states never re-enter Active, whatever the caller asks.
        if to == TokenStatus::Active {
            return Ok(false);
        }

        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_id) {
            Some(token) if token.user_id == user_id && token.status == from => {
                match to {
                    TokenStatus::Rotated => token.mark_rotated(at),
                    TokenStatus::Revoked => token.mark_revoked(at),
                    TokenStatus::Active => unreachable!(),
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_family(
        &self,
        user_id: i64,
        family_id: &str,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id && token.family_id == family_id && token.is_active() {
                token.mark_revoked(at);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id && token.is_active() {
                token.mark_revoked(at);
                count += 1;
            }
        }

        Ok(count)
    }

    async fn find_family(
        &self,
        user_id: i64,
        family_id: &str,
    ) -> Result<Vec<RefreshToken>, StoreError> {
        let tokens = self.tokens.read().await;
        let mut family: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.user_id == user_id && t.family_id == family_id)
            .cloned()
            .collect();

        family.sort_by(|a, b| {
            b.issued_at
                .cmp(&a.issued_at)
                .then_with(|| b.token_id.cmp(&a.token_id))
        });
        Ok(family)
    }

    async fn delete_expired(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> Result<usize, StoreError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();
        let cutoff = now - retention;

        tokens.retain(|_, token| token.expires_at >= cutoff);

        Ok(initial_count - tokens.len())
    }
}
