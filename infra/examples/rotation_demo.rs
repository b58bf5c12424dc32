//! Example demonstrating the refresh token rotation lifecycle
//!
//! Run with: cargo run --example rotation_demo
//!
//! Uses the in-memory store so it runs without a database. Swap in
//! `MySqlTokenRepository` built from a `DatabasePool` for the real thing.

use std::sync::Arc;

use tw_core::domain::value_objects::BindingContext;
use tw_core::errors::RotationError;
use tw_core::repositories::{InMemorySecurityEventLog, InMemoryTokenStore, TokenRepository};
use tw_core::services::clock::SystemClock;
use tw_core::services::codec::JwtTokenCodec;
use tw_core::services::rotation::{RotationConfig, RotationEngine};
use tw_shared::config::TokenConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Wire the engine with in-memory collaborators
    let store = Arc::new(InMemoryTokenStore::new());
    let codec = Arc::new(JwtTokenCodec::new(
        &TokenConfig::new("demo-secret-change-me"),
    )?);
    let clock = Arc::new(SystemClock);
    let events = Arc::new(InMemorySecurityEventLog::new());

    let engine = RotationEngine::with_event_log(
        store.clone(),
        codec,
        clock,
        events.clone(),
        RotationConfig::default(),
    )?;

    let context = BindingContext::new("203.0.113.7", "demo-client/1.0");

    println!("\n=== Issuing a root token ===");
    let first = engine.issue(42, &context).await?;
    println!("Issued token {} (family {})", first.token_id, first.family_id);

    println!("\n=== Rotating it ===");
    let second = engine.rotate(&first.refresh_token, &context).await?;
    println!("Rotated into {} (same family: {})", second.token_id, second.family_id);

    println!("\n=== Replaying the consumed token ===");
    match engine.rotate(&first.refresh_token, &context).await {
        Err(RotationError::ReuseDetected) => {
            println!("Replay detected; the whole family is revoked");
        }
        other => println!("Unexpected outcome: {:?}", other.map(|t| t.token_id)),
    }

    let active = store.count_active_in_family(42, &first.family_id).await?;
    println!("Active tokens left in the family: {}", active);

    println!("\n=== Recorded security events ===");
    for event in events.events() {
        println!(
            "{} user={} token={:?} detail={:?}",
            event.event_type.as_str(),
            event.user_id,
            event.token_id,
            event.detail
        );
    }

    Ok(())
}
