//! In-memory implementation of SecurityEventRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::domain::entities::security_event::{SecurityEvent, SecurityEventType};
use crate::errors::StoreError;

use super::SecurityEventRepository;

/// Security event sink backed by a process-local vector
///
/// Used by tests to assert on what the engine recorded, and usable as
/// the sink for single-process deployments that only need recent events.
pub struct InMemorySecurityEventLog {
    events: Arc<Mutex<Vec<SecurityEvent>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl InMemorySecurityEventLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            fail_writes: Arc::new(Mutex::new(false)),
        }
    }

    /// Make subsequent writes fail, for exercising best-effort recording
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Get all recorded events
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Get recorded events of one type
    pub fn events_of_type(&self, event_type: SecurityEventType) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Clear all recorded events
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Default for InMemorySecurityEventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecurityEventRepository for InMemorySecurityEventLog {
    async fn record(&self, event: &SecurityEvent) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::Unavailable {
                message: "event log write disabled".to_string(),
            });
        }

        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SecurityEvent>, StoreError> {
        let events = self.events.lock().unwrap();
        let mut matching: Vec<SecurityEvent> = events
            .iter()
            .filter(|e| e.user_id == user_id && e.created_at >= since)
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }
}
