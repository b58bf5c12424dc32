//! Refresh token rotation module
//!
//! This module implements the complete rotation lifecycle:
//! - Issuing root tokens for new families
//! - Single-use rotation with reuse detection
//! - Family-wide revocation on replay or theft signals
//! - Context binding with a configurable mismatch policy
//! - Background pruning of records past their retention window

mod config;
mod engine;
mod sweeper;

#[cfg(test)]
mod tests;

pub use config::{ContextMismatchPolicy, RotationConfig};
pub use engine::RotationEngine;
pub use sweeper::{RetentionSweeper, SweeperConfig};
