//! Client binding context value object.

use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The client context a refresh token is bound to
///
/// Captured at issuance and presented again at every rotation. Tokens
/// never store the raw values; only the fingerprint is persisted, so a
/// leaked store does not reveal addresses or client signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingContext {
    /// Network address the request originated from
    pub network_address: String,

    /// Client software signature (user agent or equivalent)
    pub client_signature: String,
}

impl BindingContext {
    /// Creates a new binding context
    pub fn new(network_address: impl Into<String>, client_signature: impl Into<String>) -> Self {
        Self {
            network_address: network_address.into(),
            client_signature: client_signature.into(),
        }
    }

    /// Checks that both constituents are present and non-blank
    pub fn is_complete(&self) -> bool {
        !self.network_address.trim().is_empty() && !self.client_signature.trim().is_empty()
    }

    /// Computes the opaque fingerprint persisted with a token
    ///
    /// # Returns
    ///
    /// Hex-encoded SHA-256 over the two constituents with a separator
    /// that keeps `("ab", "c")` and `("a", "bc")` distinct.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.network_address.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.client_signature.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compares this context against a stored fingerprint in constant time
    pub fn matches_fingerprint(&self, stored: &str) -> bool {
        constant_time_eq(self.fingerprint().as_bytes(), stored.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_complete() {
        assert!(BindingContext::new("203.0.113.7", "app/1.4.2 (android)").is_complete());
        assert!(!BindingContext::new("", "app/1.4.2").is_complete());
        assert!(!BindingContext::new("203.0.113.7", "   ").is_complete());
    }

    #[test]
    fn test_fingerprint_is_stable_and_hex() {
        let context = BindingContext::new("203.0.113.7", "app/1.4.2");
        let fingerprint = context.fingerprint();

        assert_eq!(fingerprint, context.fingerprint());
        assert_eq!(fingerprint.len(), 64);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_separates_constituents() {
        let a = BindingContext::new("ab", "c");
        let b = BindingContext::new("a", "bc");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_matches_fingerprint() {
        let issued = BindingContext::new("203.0.113.7", "app/1.4.2");
        let same = BindingContext::new("203.0.113.7", "app/1.4.2");
        let drifted = BindingContext::new("198.51.100.9", "app/1.4.2");

        let stored = issued.fingerprint();
        assert!(same.matches_fingerprint(&stored));
        assert!(!drifted.matches_fingerprint(&stored));
    }
}
