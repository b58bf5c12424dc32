//! Tests for the token store contract

#[cfg(test)]
mod store_contract_tests;
