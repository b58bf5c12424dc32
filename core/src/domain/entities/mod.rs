//! Domain entities representing core business objects.

pub mod security_event;
pub mod token;

// Re-export commonly used types
pub use security_event::{SecurityEvent, SecurityEventType};
pub use token::{RefreshToken, TokenStatus, REFRESH_TOKEN_TTL_DAYS};
