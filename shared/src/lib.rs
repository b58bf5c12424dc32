//! Shared utilities and common types for Token Warden services
//!
//! This crate provides common functionality used across all workspace members:
//! - Configuration types and environment-aware loading
//! - Error response structure and stable error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{AppConfig, DatabaseConfig, Environment, TokenConfig};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
