//! Security event repository module.

mod memory;
mod noop;
mod r#trait;

pub use memory::InMemorySecurityEventLog;
pub use noop::NoOpSecurityEventRepository;
pub use r#trait::SecurityEventRepository;
