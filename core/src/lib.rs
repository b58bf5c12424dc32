//! # Token Warden Core
//!
//! Core rotation engine and domain layer for the Token Warden backend.
//! This crate contains the refresh token entity and its lifecycle state
//! machine, the rotation engine, store interfaces, and error types that
//! form the foundation of the service.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
