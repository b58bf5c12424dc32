//! Background retention sweeper for aged-out token records.
//!
//! Terminal records are kept on purpose so that replays of dead tokens
//! hit reuse detection instead of looking like unknown tokens. This
//! sweeper deletes only rows that expired longer ago than the retention
//! window, live and recently-expired rows stay in place.

use std::sync::Arc;

use chrono::Duration;
use tracing::{error, info, warn};

use crate::errors::RotationError;
use crate::repositories::TokenRepository;
use crate::services::clock::Clock;

/// Configuration for the retention sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to run a sweep (in seconds)
    pub interval_seconds: u64,
    /// How long a record stays visible after its expiry (in days)
    pub retention_days: i64,
    /// Whether the sweeper runs at all
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            retention_days: 7,      // Keep expired records for 7 days
            enabled: true,
        }
    }
}

/// Service that prunes token records past their retention window
pub struct RetentionSweeper<S, K>
where
    S: TokenRepository + 'static,
    K: Clock + 'static,
{
    store: Arc<S>,
    clock: Arc<K>,
    config: SweeperConfig,
}

impl<S, K> RetentionSweeper<S, K>
where
    S: TokenRepository,
    K: Clock,
{
    /// Creates a new retention sweeper
    pub fn new(store: Arc<S>, clock: Arc<K>, config: SweeperConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Runs a single sweep cycle
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    /// * `Err(RotationError)` - If the store rejected the sweep
    pub async fn run_sweep(&self) -> Result<usize, RotationError> {
        if !self.config.enabled {
            return Ok(0);
        }

        let now = self.clock.now();
        let retention = Duration::days(self.config.retention_days);
        let deleted = self.store.delete_expired(now, retention).await?;

        info!("Deleted {} expired refresh tokens", deleted);

        Ok(deleted)
    }

    /// Starts the sweeper as a background task
    ///
    /// This spawns a tokio task that runs a sweep at regular intervals
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Retention sweeper is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Retention sweeper started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_sweep().await {
                    error!("Retention sweep failed: {}", e);
                }
            }
        });
    }
}
