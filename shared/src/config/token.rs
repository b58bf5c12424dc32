//! Refresh token signing and rotation configuration

use serde::{Deserialize, Serialize};

/// Refresh token configuration: signing material plus rotation policy knobs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Secret key for signing refresh tokens (HS256)
    pub secret: String,

    /// Signing algorithm (default: HS256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Issuer claim stamped into every token
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Audience claim (optional)
    #[serde(default)]
    pub audience: Option<String>,

    /// Refresh token lifetime in days
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,

    /// How context drift is handled: "strict", "reject", or "lenient"
    #[serde(default = "default_context_policy")]
    pub context_policy: String,

    /// Path to a PEM-encoded RSA private key, required for RS256 signing
    #[serde(default)]
    pub rsa_private_key_path: Option<String>,

    /// Path to a PEM-encoded RSA public key, required for RS256 verification
    #[serde(default)]
    pub rsa_public_key_path: Option<String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::from("your-secret-key-change-in-production"),
            algorithm: default_algorithm(),
            issuer: default_issuer(),
            audience: None,
            refresh_ttl_days: default_refresh_ttl_days(),
            context_policy: default_context_policy(),
            rsa_private_key_path: None,
            rsa_public_key_path: None,
        }
    }
}

impl TokenConfig {
    /// Create a new token configuration with the given signing secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set the refresh token lifetime in days
    pub fn with_refresh_ttl_days(mut self, days: i64) -> Self {
        self.refresh_ttl_days = days;
        self
    }

    /// Set the context mismatch policy by name
    pub fn with_context_policy(mut self, policy: impl Into<String>) -> Self {
        self.context_policy = policy.into();
        self
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the audience claim
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Switch to RS256 signing with PEM-encoded key files
    pub fn with_rs256_keys(
        mut self,
        private_key_path: impl Into<String>,
        public_key_path: impl Into<String>,
    ) -> Self {
        self.algorithm = String::from("RS256");
        self.rsa_private_key_path = Some(private_key_path.into());
        self.rsa_public_key_path = Some(public_key_path.into());
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == "your-secret-key-change-in-production"
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "development-secret-please-change-in-production".to_string());
        let refresh_ttl_days = std::env::var("REFRESH_TOKEN_TTL_DAYS")
            .unwrap_or_else(|_| default_refresh_ttl_days().to_string())
            .parse()
            .unwrap_or_else(|_| default_refresh_ttl_days());
        let context_policy = std::env::var("CONTEXT_MISMATCH_POLICY")
            .unwrap_or_else(|_| default_context_policy());

        Self {
            secret,
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| default_algorithm()),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| default_issuer()),
            audience: std::env::var("JWT_AUDIENCE").ok(),
            refresh_ttl_days,
            context_policy,
            rsa_private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH").ok(),
            rsa_public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH").ok(),
        }
    }
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_issuer() -> String {
    String::from("token-warden")
}

fn default_refresh_ttl_days() -> i64 {
    7
}

fn default_context_policy() -> String {
    String::from("reject")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_config_default() {
        let config = TokenConfig::default();
        assert_eq!(config.algorithm, "HS256");
        assert_eq!(config.issuer, "token-warden");
        assert_eq!(config.refresh_ttl_days, 7);
        assert_eq!(config.context_policy, "reject");
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_token_config_builder() {
        let config = TokenConfig::new("my-secret")
            .with_refresh_ttl_days(14)
            .with_context_policy("strict")
            .with_audience("mobile-clients");

        assert_eq!(config.refresh_ttl_days, 14);
        assert_eq!(config.context_policy, "strict");
        assert_eq!(config.audience.as_deref(), Some("mobile-clients"));
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_rs256_key_paths() {
        let config = TokenConfig::new("unused").with_rs256_keys("keys/private.pem", "keys/public.pem");

        assert_eq!(config.algorithm, "RS256");
        assert_eq!(config.rsa_private_key_path.as_deref(), Some("keys/private.pem"));
        assert_eq!(config.rsa_public_key_path.as_deref(), Some("keys/public.pem"));
    }
}
