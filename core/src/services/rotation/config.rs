//! Configuration for the rotation engine.

use std::str::FromStr;

use chrono::Duration;

use tw_shared::config::TokenConfig;

use crate::domain::entities::token::REFRESH_TOKEN_TTL_DAYS;
use crate::errors::RotationError;

/// How the engine treats a rotation whose presented context does not
/// match the fingerprint the token was bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMismatchPolicy {
    /// Treat drift as theft: refuse the rotation and revoke the family
    Strict,
    /// Refuse the rotation but leave the token usable from its bound context
    Reject,
    /// Allow the rotation, rebind to the new context, record the observation
    Lenient,
}

impl Default for ContextMismatchPolicy {
    fn default() -> Self {
        ContextMismatchPolicy::Reject
    }
}

impl ContextMismatchPolicy {
    /// Returns the configuration name of the policy
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextMismatchPolicy::Strict => "strict",
            ContextMismatchPolicy::Reject => "reject",
            ContextMismatchPolicy::Lenient => "lenient",
        }
    }
}

impl std::fmt::Display for ContextMismatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContextMismatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ContextMismatchPolicy::Strict),
            "reject" => Ok(ContextMismatchPolicy::Reject),
            "lenient" => Ok(ContextMismatchPolicy::Lenient),
            other => Err(format!("Unknown context mismatch policy: {}", other)),
        }
    }
}

/// Configuration for the rotation engine
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Lifetime of every issued refresh token
    pub refresh_ttl: Duration,
    /// Behavior when the presented context does not match the bound one
    pub mismatch_policy: ContextMismatchPolicy,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            refresh_ttl: Duration::days(REFRESH_TOKEN_TTL_DAYS),
            mismatch_policy: ContextMismatchPolicy::default(),
        }
    }
}

impl RotationConfig {
    /// Builds the engine configuration from the shared token settings
    ///
    /// # Returns
    ///
    /// The parsed configuration, or a validation error when the TTL is
    /// not positive or the policy name is unknown
    pub fn from_token_config(config: &TokenConfig) -> Result<Self, RotationError> {
        let mismatch_policy =
            config
                .context_policy
                .parse()
                .map_err(|_| RotationError::Validation {
                    field: "context_policy".to_string(),
                })?;

        let parsed = Self {
            refresh_ttl: Duration::days(config.refresh_ttl_days),
            mismatch_policy,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks the invariants the engine relies on
    pub fn validate(&self) -> Result<(), RotationError> {
        if self.refresh_ttl <= Duration::zero() {
            return Err(RotationError::Validation {
                field: "refresh_ttl".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse_round_trip() {
        let all = [
            ContextMismatchPolicy::Strict,
            ContextMismatchPolicy::Reject,
            ContextMismatchPolicy::Lenient,
        ];
        for policy in all {
            assert_eq!(policy.as_str().parse::<ContextMismatchPolicy>().unwrap(), policy);
        }
        assert_eq!("STRICT".parse::<ContextMismatchPolicy>().unwrap(), ContextMismatchPolicy::Strict);
        assert!("paranoid".parse::<ContextMismatchPolicy>().is_err());
    }

    #[test]
    fn test_default_policy_rejects_without_cascade() {
        assert_eq!(ContextMismatchPolicy::default(), ContextMismatchPolicy::Reject);
        assert_eq!(RotationConfig::default().mismatch_policy, ContextMismatchPolicy::Reject);
    }

    #[test]
    fn test_from_token_config() {
        let shared = TokenConfig::new("secret")
            .with_refresh_ttl_days(14)
            .with_context_policy("strict");

        let config = RotationConfig::from_token_config(&shared).unwrap();

        assert_eq!(config.refresh_ttl, Duration::days(14));
        assert_eq!(config.mismatch_policy, ContextMismatchPolicy::Strict);
    }

    #[test]
    fn test_from_token_config_rejects_bad_values() {
        let zero_ttl = TokenConfig::new("secret").with_refresh_ttl_days(0);
        assert!(matches!(
            RotationConfig::from_token_config(&zero_ttl),
            Err(RotationError::Validation { .. })
        ));

        let bad_policy = TokenConfig::new("secret").with_context_policy("paranoid");
        assert!(matches!(
            RotationConfig::from_token_config(&bad_policy),
            Err(RotationError::Validation { .. })
        ));
    }
}
