//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Token Warden
//! service. It provides the concrete MySQL persistence behind the core
//! crate's store interfaces.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL implementations of `TokenRepository` and
//!   `SecurityEventRepository` using SQLx, plus connection pool management
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use tw_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
