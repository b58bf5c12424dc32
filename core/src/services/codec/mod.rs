//! Signed wire form of refresh tokens
//!
//! The codec seals a token record into the bearer string clients hold
//! and verifies presented strings back into claims. Verification covers
//! structure, signature, issuer, and audience; expiry is left to the
//! engine, which judges it against the stored record.

mod claims;
mod jwt;
mod r#trait;

pub use claims::RefreshClaims;
pub use jwt::JwtTokenCodec;
pub use r#trait::TokenCodec;
