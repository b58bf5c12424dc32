//! MySQL implementation of the TokenRepository trait.
//!
//! This module provides the concrete implementation of refresh token
//! persistence using MySQL database with SQLx. Records live in the
//! `refresh_tokens` table, keyed by `token_id` with an index on
//! `(user_id, family_id)`; the conditional UPDATE on the status column
//! is what makes the engine's compare-and-swap linearizable per row.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{MySqlPool, Row};

use tw_core::domain::entities::token::{RefreshToken, TokenStatus};
use tw_core::errors::StoreError;
use tw_core::repositories::TokenRepository;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    ///
    /// # Returns
    /// A new instance of MySqlTokenRepository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    ///
    /// Maps database columns to RefreshToken struct fields
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, StoreError> {
        let status_str: String = row.try_get("status").map_err(|e| StoreError::Unavailable {
            message: format!("Failed to get status: {}", e),
        })?;
        let status: TokenStatus = status_str.parse().map_err(|e: String| {
            StoreError::Unavailable { message: e }
        })?;

        Ok(RefreshToken {
            token_id: row.try_get("token_id").map_err(|e| StoreError::Unavailable {
                message: format!("Failed to get token_id: {}", e),
            })?,
            user_id: row.try_get("user_id").map_err(|e| StoreError::Unavailable {
                message: format!("Failed to get user_id: {}", e),
            })?,
            family_id: row.try_get("family_id").map_err(|e| StoreError::Unavailable {
                message: format!("Failed to get family_id: {}", e),
            })?,
            parent_token_id: row.try_get("parent_token_id").map_err(|e| {
                StoreError::Unavailable {
                    message: format!("Failed to get parent_token_id: {}", e),
                }
            })?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| StoreError::Unavailable {
                    message: format!("Failed to get issued_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| StoreError::Unavailable {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
            bound_context: row.try_get("bound_context").map_err(|e| {
                StoreError::Unavailable {
                    message: format!("Failed to get bound_context: {}", e),
                }
            })?,
            status,
            status_changed_at: row
                .try_get::<Option<DateTime<Utc>>, _>("status_changed_at")
                .map_err(|e| StoreError::Unavailable {
                    message: format!("Failed to get status_changed_at: {}", e),
                })?,
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn insert(&self, token: RefreshToken) -> Result<RefreshToken, StoreError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                token_id, user_id, family_id, parent_token_id,
                issued_at, expires_at, bound_context, status, status_changed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&token.token_id)
            .bind(token.user_id)
            .bind(&token.family_id)
            .bind(&token.parent_token_id)
            .bind(token.issued_at)
            .bind(token.expires_at)
            .bind(&token.bound_context)
            .bind(token.status.as_str())
            .bind(token.status_changed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .map_or(false, |db| db.is_unique_violation())
                {
                    StoreError::DuplicateTokenId {
                        token_id: token.token_id.clone(),
                    }
                } else {
                    StoreError::Unavailable {
                        message: format!("Failed to insert refresh token: {}", e),
                    }
                }
            })?;

        Ok(token)
    }

    async fn find(&self, user_id: i64, token_id: &str) -> Result<Option<RefreshToken>, StoreError> {
        let query = r#"
            SELECT token_id, user_id, family_id, parent_token_id,
                   issued_at, expires_at, bound_context, status, status_changed_at
            FROM refresh_tokens
            WHERE user_id = ? AND token_id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(token_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to find refresh token: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
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

        let query = r#"
            UPDATE refresh_tokens
            SET status = ?, status_changed_at = ?
            WHERE user_id = ? AND token_id = ? AND status = ?
        "#;

        let result = sqlx::query(query)
            .bind(to.as_str())
            .bind(at)
            .bind(user_id)
            .bind(token_id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to transition token status: {}", e),
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_family(
        &self,
        user_id: i64,
        family_id: &str,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let query = r#"
            UPDATE refresh_tokens
            SET status = ?, status_changed_at = ?
            WHERE user_id = ? AND family_id = ? AND status = ?
        "#;

        let result = sqlx::query(query)
            .bind(TokenStatus::Revoked.as_str())
            .bind(at)
            .bind(user_id)
            .bind(family_id)
            .bind(TokenStatus::Active.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to revoke token family: {}", e),
            })?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let query = r#"
            UPDATE refresh_tokens
            SET status = ?, status_changed_at = ?
            WHERE user_id = ? AND status = ?
        "#;

        let result = sqlx::query(query)
            .bind(TokenStatus::Revoked.as_str())
            .bind(at)
            .bind(user_id)
            .bind(TokenStatus::Active.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to revoke user tokens: {}", e),
            })?;

        Ok(result.rows_affected() as usize)
    }

    async fn find_family(
        &self,
        user_id: i64,
        family_id: &str,
    ) -> Result<Vec<RefreshToken>, StoreError> {
        let query = r#"
            SELECT token_id, user_id, family_id, parent_token_id,
                   issued_at, expires_at, bound_context, status, status_changed_at
            FROM refresh_tokens
            WHERE user_id = ? AND family_id = ?
            ORDER BY issued_at DESC, token_id DESC
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(family_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to find token family: {}", e),
            })?;

        rows.iter()
            .map(Self::row_to_token)
            .collect::<Result<Vec<_>, _>>()
    }

    async fn delete_expired(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> Result<usize, StoreError> {
        let query = r#"
            DELETE FROM refresh_tokens
            WHERE expires_at < ?
        "#;

        let cutoff = now - retention;
        let result = sqlx::query(query)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to delete expired tokens: {}", e),
            })?;

        Ok(result.rows_affected() as usize)
    }

    async fn count_active_in_family(
        &self,
        user_id: i64,
        family_id: &str,
    ) -> Result<usize, StoreError> {
        let query = r#"
            SELECT COUNT(*) AS active_count
            FROM refresh_tokens
            WHERE user_id = ? AND family_id = ? AND status = ?
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(family_id)
            .bind(TokenStatus::Active.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to count active tokens: {}", e),
            })?;

        let count: i64 = row.try_get("active_count").map_err(|e| StoreError::Unavailable {
            message: format!("Failed to get active_count: {}", e),
        })?;

        Ok(count as usize)
    }
}
