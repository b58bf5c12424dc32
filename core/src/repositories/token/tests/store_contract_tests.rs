//! Contract tests for the token store
//!
//! These run against the in-memory store, but every expectation here is
//! part of the `TokenRepository` contract and holds for the SQL store
//! as well: conditional transitions are races with one winner, terminal
//! states are permanent, and family revocation is idempotent.

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::token::{RefreshToken, TokenStatus};
use crate::errors::StoreError;
use crate::repositories::token::{InMemoryTokenStore, TokenRepository};

fn fixed_now() -> DateTime<Utc> {
    "2025-06-01T12:00:00Z".parse().unwrap()
}

fn active_token(user_id: i64, now: DateTime<Utc>) -> RefreshToken {
    RefreshToken::issue(user_id, "ctx-fingerprint".to_string(), now, Duration::days(7))
}

#[tokio::test]
async fn test_insert_and_find() {
    let store = InMemoryTokenStore::new();
    let now = fixed_now();
    let token = active_token(42, now);

    let stored = store.insert(token.clone()).await.unwrap();
    assert_eq!(stored.token_id, token.token_id);

    let found = store.find(42, &token.token_id).await.unwrap();
    assert_eq!(found, Some(token));
}

#[tokio::test]
async fn test_find_checks_ownership() {
    let store = InMemoryTokenStore::new();
    let token = active_token(42, fixed_now());
    store.insert(token.clone()).await.unwrap();

    // Same token id under a different user yields nothing
    let found = store.find(43, &token.token_id).await.unwrap();
    assert!(found.is_none());

    let missing = store.find(42, "no-such-token").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_duplicate_insert_rejected() {
    let store = InMemoryTokenStore::new();
    let token = active_token(42, fixed_now());

    store.insert(token.clone()).await.unwrap();

    let result = store.insert(token).await;
    assert!(matches!(result, Err(StoreError::DuplicateTokenId { .. })));
}

#[tokio::test]
async fn test_transition_succeeds_once() {
    let store = InMemoryTokenStore::new();
    let now = fixed_now();
    let token = active_token(42, now);
    store.insert(token.clone()).await.unwrap();

    let later = now + Duration::minutes(5);
    let won = store
        .transition_status(42, &token.token_id, TokenStatus::Active, TokenStatus::Rotated, later)
        .await
        .unwrap();
    assert!(won);

    let stored = store.find(42, &token.token_id).await.unwrap().unwrap();
    assert_eq!(stored.status, TokenStatus::Rotated);
    assert_eq!(stored.status_changed_at, Some(later));

    // Second attempt sees a non-Active status and loses
    let second = store
        .transition_status(42, &token.token_id, TokenStatus::Active, TokenStatus::Rotated, later)
        .await
        .unwrap();
    assert!(!second);
}

#[tokio::test]
async fn test_transition_on_missing_token_is_false() {
    let store = InMemoryTokenStore::new();

    let won = store
        .transition_status(42, "ghost", TokenStatus::Active, TokenStatus::Revoked, fixed_now())
        .await
        .unwrap();
    assert!(!won);
}

#[tokio::test]
async fn test_terminal_states_never_reactivate() {
    let store = InMemoryTokenStore::new();
    let now = fixed_now();
    let token = active_token(42, now);
    store.insert(token.clone()).await.unwrap();

    store
        .transition_status(42, &token.token_id, TokenStatus::Active, TokenStatus::Revoked, now)
        .await
        .unwrap();

    // Even a matching from-status cannot move a record back to Active
    let reactivated = store
        .transition_status(42, &token.token_id, TokenStatus::Revoked, TokenStatus::Active, now)
        .await
        .unwrap();
    assert!(!reactivated);

    let stored = store.find(42, &token.token_id).await.unwrap().unwrap();
    assert_eq!(stored.status, TokenStatus::Revoked);

    // Rotated is just as permanent
    let other = active_token(42, now);
    store.insert(other.clone()).await.unwrap();
    store
        .transition_status(42, &other.token_id, TokenStatus::Active, TokenStatus::Rotated, now)
        .await
        .unwrap();
    let reactivated = store
        .transition_status(42, &other.token_id, TokenStatus::Rotated, TokenStatus::Active, now)
        .await
        .unwrap();
    assert!(!reactivated);
}

#[tokio::test]
async fn test_revoke_family_is_scoped_and_idempotent() {
    let store = InMemoryTokenStore::new();
    let now = fixed_now();

    let root = active_token(42, now);
    let child = RefreshToken::successor_of(&root, "ctx".to_string(), now, Duration::days(7));
    let other_family = active_token(42, now);
    let other_user = active_token(7, now);

    store.insert(root.clone()).await.unwrap();
    store.insert(child.clone()).await.unwrap();
    store.insert(other_family.clone()).await.unwrap();
    store.insert(other_user.clone()).await.unwrap();

    let revoked = store.revoke_family(42, &root.family_id, now).await.unwrap();
    assert_eq!(revoked, 2);

    // Unrelated family and user are untouched
    let still_active = store.find(42, &other_family.token_id).await.unwrap().unwrap();
    assert!(still_active.is_active());
    let still_active = store.find(7, &other_user.token_id).await.unwrap().unwrap();
    assert!(still_active.is_active());

    // Second cascade finds nothing left to revoke
    let again = store.revoke_family(42, &root.family_id, now).await.unwrap();
    assert_eq!(again, 0);

    let family = store.find_family(42, &root.family_id).await.unwrap();
    assert!(family.iter().all(|t| t.status == TokenStatus::Revoked));
}

#[tokio::test]
async fn test_revoke_all_for_user() {
    let store = InMemoryTokenStore::new();
    let now = fixed_now();

    for _ in 0..3 {
        store.insert(active_token(42, now)).await.unwrap();
    }
    let other = active_token(7, now);
    store.insert(other.clone()).await.unwrap();

    let revoked = store.revoke_all_for_user(42, now).await.unwrap();
    assert_eq!(revoked, 3);

    let untouched = store.find(7, &other.token_id).await.unwrap().unwrap();
    assert!(untouched.is_active());

    // Nothing active remains for the user
    let again = store.revoke_all_for_user(42, now).await.unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn test_find_family_orders_newest_first() {
    let store = InMemoryTokenStore::new();
    let now = fixed_now();

    let root = active_token(42, now);
    let child =
        RefreshToken::successor_of(&root, "ctx".to_string(), now + Duration::minutes(10), Duration::days(7));
    let grandchild =
        RefreshToken::successor_of(&child, "ctx".to_string(), now + Duration::minutes(20), Duration::days(7));

    store.insert(root.clone()).await.unwrap();
    store.insert(child.clone()).await.unwrap();
    store.insert(grandchild.clone()).await.unwrap();

    let family = store.find_family(42, &root.family_id).await.unwrap();
    let ids: Vec<&str> = family.iter().map(|t| t.token_id.as_str()).collect();
    assert_eq!(ids, vec![
        grandchild.token_id.as_str(),
        child.token_id.as_str(),
        root.token_id.as_str(),
    ]);
}

#[tokio::test]
async fn test_count_active_in_family() {
    let store = InMemoryTokenStore::new();
    let now = fixed_now();

    let root = active_token(42, now);
    let child = RefreshToken::successor_of(&root, "ctx".to_string(), now, Duration::days(7));
    store.insert(root.clone()).await.unwrap();
    store.insert(child.clone()).await.unwrap();

    assert_eq!(store.count_active_in_family(42, &root.family_id).await.unwrap(), 2);

    store
        .transition_status(42, &root.token_id, TokenStatus::Active, TokenStatus::Rotated, now)
        .await
        .unwrap();

    assert_eq!(store.count_active_in_family(42, &root.family_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_expired_honors_retention() {
    let store = InMemoryTokenStore::new();
    let now = fixed_now();
    let retention = Duration::days(7);

    // Expired long past the retention window
    let stale = RefreshToken::issue(42, "ctx".to_string(), now - Duration::days(30), Duration::days(7));
    // Expired, but recently enough that a replay must still be recognizable
    let recent = RefreshToken::issue(42, "ctx".to_string(), now - Duration::days(10), Duration::days(7));
    // Still alive
    let live = active_token(42, now);

    store.insert(stale.clone()).await.unwrap();
    store.insert(recent.clone()).await.unwrap();
    store.insert(live.clone()).await.unwrap();

    let deleted = store.delete_expired(now, retention).await.unwrap();
    assert_eq!(deleted, 1);

    assert!(store.find(42, &stale.token_id).await.unwrap().is_none());
    assert!(store.find(42, &recent.token_id).await.unwrap().is_some());
    assert!(store.find(42, &live.token_id).await.unwrap().is_some());
}
