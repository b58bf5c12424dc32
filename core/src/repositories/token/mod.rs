//! Token store module.

mod memory;
mod r#trait;

pub use memory::InMemoryTokenStore;
pub use r#trait::TokenRepository;

#[cfg(test)]
mod tests;
