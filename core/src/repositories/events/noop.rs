//! No-op implementation of SecurityEventRepository for when event recording is not needed

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::security_event::SecurityEvent;
use crate::errors::StoreError;

use super::SecurityEventRepository;

/// No-op implementation of SecurityEventRepository
///
/// Drops every event. Used when the deployment has no event sink.
pub struct NoOpSecurityEventRepository;

impl NoOpSecurityEventRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpSecurityEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecurityEventRepository for NoOpSecurityEventRepository {
    async fn record(&self, _event: &SecurityEvent) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_by_user(
        &self,
        _user_id: i64,
        _since: DateTime<Utc>,
        _limit: usize,
    ) -> Result<Vec<SecurityEvent>, StoreError> {
        Ok(Vec::new())
    }
}

// Also implement for () to allow simple type defaults
#[async_trait]
impl SecurityEventRepository for () {
    async fn record(&self, _event: &SecurityEvent) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_by_user(
        &self,
        _user_id: i64,
        _since: DateTime<Utc>,
        _limit: usize,
    ) -> Result<Vec<SecurityEvent>, StoreError> {
        Ok(Vec::new())
    }
}
