//! Tests for the rotation module

#[cfg(test)]
mod sweeper_tests;
