pub mod events;
pub mod token;

pub use events::{InMemorySecurityEventLog, NoOpSecurityEventRepository, SecurityEventRepository};
pub use token::{InMemoryTokenStore, TokenRepository};
