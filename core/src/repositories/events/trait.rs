//! Security event repository trait defining the interface for event persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::security_event::SecurityEvent;
use crate::errors::StoreError;

/// Repository trait for SecurityEvent persistence
///
/// Recording is best-effort from the engine's point of view: a failed
/// write is logged and swallowed, never allowed to fail the rotation
/// that produced it. Implementations should therefore keep writes cheap.
#[async_trait]
pub trait SecurityEventRepository: Send + Sync {
    /// Record a security event
    ///
    /// # Arguments
    /// * `event` - The event to persist
    ///
    /// # Returns
    /// * `Ok(())` on successful recording
    /// * `Err(StoreError)` if the write fails
    async fn record(&self, event: &SecurityEvent) -> Result<(), StoreError>;

    /// Find recent events for a user, newest first
    ///
    /// # Arguments
    /// * `user_id` - The user to search for
    /// * `since` - Only return events recorded after this time
    /// * `limit` - Maximum number of records to return
    async fn find_by_user(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SecurityEvent>, StoreError>;
}
