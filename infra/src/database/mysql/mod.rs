//! MySQL repository implementations

mod security_event_repository_impl;
mod token_repository_impl;

pub use security_event_repository_impl::MySqlSecurityEventRepository;
pub use token_repository_impl::MySqlTokenRepository;
