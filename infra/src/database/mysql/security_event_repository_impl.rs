//! MySQL implementation of the SecurityEventRepository trait.
//!
//! This module provides the concrete implementation of security event
//! persistence using MySQL database with SQLx. Events land in the
//! append-only `security_events` table; the engine treats writes as
//! best-effort, so failures here must stay cheap to report.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use tw_core::domain::entities::security_event::{SecurityEvent, SecurityEventType};
use tw_core::errors::StoreError;
use tw_core::repositories::SecurityEventRepository;

/// MySQL implementation of SecurityEventRepository
pub struct MySqlSecurityEventRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlSecurityEventRepository {
    /// Create a new MySQL security event repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    ///
    /// # Returns
    /// A new instance of MySqlSecurityEventRepository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to SecurityEvent entity
    fn row_to_event(row: &sqlx::mysql::MySqlRow) -> Result<SecurityEvent, StoreError> {
        let id: String = row.try_get("id").map_err(|e| StoreError::Unavailable {
            message: format!("Failed to get id: {}", e),
        })?;

        let event_type_str: String =
            row.try_get("event_type").map_err(|e| StoreError::Unavailable {
                message: format!("Failed to get event_type: {}", e),
            })?;
        let event_type = SecurityEventType::from_str(&event_type_str).ok_or_else(|| {
            StoreError::Unavailable {
                message: format!("Unknown event type: {}", event_type_str),
            }
        })?;

        let detail_json: Option<String> =
            row.try_get("detail").map_err(|e| StoreError::Unavailable {
                message: format!("Failed to get detail: {}", e),
            })?;
        let detail = detail_json
            .map(|d| serde_json::from_str(&d))
            .transpose()
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to parse detail: {}", e),
            })?;

        Ok(SecurityEvent {
            id: Uuid::parse_str(&id).map_err(|e| StoreError::Unavailable {
                message: format!("Invalid event UUID: {}", e),
            })?,
            event_type,
            user_id: row.try_get("user_id").map_err(|e| StoreError::Unavailable {
                message: format!("Failed to get user_id: {}", e),
            })?,
            token_id: row.try_get("token_id").map_err(|e| StoreError::Unavailable {
                message: format!("Failed to get token_id: {}", e),
            })?,
            family_id: row.try_get("family_id").map_err(|e| StoreError::Unavailable {
                message: format!("Failed to get family_id: {}", e),
            })?,
            context_fingerprint: row.try_get("context_fingerprint").map_err(|e| {
                StoreError::Unavailable {
                    message: format!("Failed to get context_fingerprint: {}", e),
                }
            })?,
            detail,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| StoreError::Unavailable {
                    message: format!("Failed to get created_at: {}", e),
                })?,
        })
    }
}

#[async_trait]
impl SecurityEventRepository for MySqlSecurityEventRepository {
    async fn record(&self, event: &SecurityEvent) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO security_events (
                id, event_type, user_id, token_id, family_id,
                context_fingerprint, detail, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let detail_json = event
            .detail
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to serialize detail: {}", e),
            })?;

        sqlx::query(query)
            .bind(event.id.to_string())
            .bind(event.event_type.as_str())
            .bind(event.user_id)
            .bind(&event.token_id)
            .bind(&event.family_id)
            .bind(&event.context_fingerprint)
            .bind(detail_json)
            .bind(event.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to record security event: {}", e),
            })?;

        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SecurityEvent>, StoreError> {
        let query = r#"
            SELECT id, event_type, user_id, token_id, family_id,
                   context_fingerprint, detail, created_at
            FROM security_events
            WHERE user_id = ? AND created_at > ?
            ORDER BY created_at DESC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(since)
            .bind(limit as i32)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("Failed to find security events: {}", e),
            })?;

        rows.iter()
            .map(Self::row_to_event)
            .collect::<Result<Vec<_>, _>>()
    }
}
