//! Unit tests for the retention sweeper

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::entities::token::RefreshToken;
use crate::repositories::{InMemoryTokenStore, TokenRepository};
use crate::services::clock::ManualClock;
use crate::services::rotation::{RetentionSweeper, SweeperConfig};

fn now_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn token_issued_at(user_id: i64, issued_at: DateTime<Utc>) -> RefreshToken {
    RefreshToken::issue(user_id, "ctx".to_string(), issued_at, Duration::days(7))
}

#[tokio::test]
async fn test_sweep_prunes_only_rows_beyond_retention() {
    let store = Arc::new(InMemoryTokenStore::new());
    let clock = Arc::new(ManualClock::new(now_instant()));

    // Expired 10 days ago: past the 7-day retention window
    let stale = store
        .insert(token_issued_at(1, now_instant() - Duration::days(17)))
        .await
        .unwrap();
    // Expired exactly at the retention boundary: kept
    let boundary = store
        .insert(token_issued_at(1, now_instant() - Duration::days(14)))
        .await
        .unwrap();
    // Expired 1 day ago: still needed for reuse detection
    let recent = store
        .insert(token_issued_at(1, now_instant() - Duration::days(8)))
        .await
        .unwrap();
    let live = store.insert(token_issued_at(1, now_instant())).await.unwrap();

    let sweeper = RetentionSweeper::new(store.clone(), clock, SweeperConfig::default());
    let deleted = sweeper.run_sweep().await.unwrap();

    assert_eq!(deleted, 1);
    assert!(store.find(1, &stale.token_id).await.unwrap().is_none());
    assert!(store.find(1, &boundary.token_id).await.unwrap().is_some());
    assert!(store.find(1, &recent.token_id).await.unwrap().is_some());
    assert!(store.find(1, &live.token_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_sweep_deletes_regardless_of_status() {
    let store = Arc::new(InMemoryTokenStore::new());
    let clock = Arc::new(ManualClock::new(now_instant()));

    // A long-dead consumed token ages out under the same rule as any other
    let mut old = token_issued_at(1, now_instant() - Duration::days(30));
    old.mark_rotated(now_instant() - Duration::days(29));
    let old = store.insert(old).await.unwrap();

    let sweeper = RetentionSweeper::new(store.clone(), clock, SweeperConfig::default());
    let deleted = sweeper.run_sweep().await.unwrap();

    assert_eq!(deleted, 1);
    assert!(store.find(1, &old.token_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_disabled_sweeper_is_inert() {
    let store = Arc::new(InMemoryTokenStore::new());
    let clock = Arc::new(ManualClock::new(now_instant()));

    let old = store
        .insert(token_issued_at(1, now_instant() - Duration::days(40)))
        .await
        .unwrap();

    let config = SweeperConfig {
        enabled: false,
        ..SweeperConfig::default()
    };
    let sweeper = RetentionSweeper::new(store.clone(), clock, config);

    assert_eq!(sweeper.run_sweep().await.unwrap(), 0);
    assert!(store.find(1, &old.token_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_sweeper_config_defaults() {
    let config = SweeperConfig::default();

    assert_eq!(config.interval_seconds, 3600);
    assert_eq!(config.retention_days, 7);
    assert!(config.enabled);
}
