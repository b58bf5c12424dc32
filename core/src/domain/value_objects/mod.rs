//! Value objects representing immutable domain concepts.

pub mod binding_context;
pub mod issued_token;

// Re-export commonly used types
pub use binding_context::BindingContext;
pub use issued_token::IssuedToken;
