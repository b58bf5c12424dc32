//! JWT implementation of the token codec.

use std::fs;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use tw_shared::config::TokenConfig;

use crate::domain::entities::token::RefreshToken;
use crate::errors::{CodecError, RotationError};

use super::claims::RefreshClaims;
use super::r#trait::TokenCodec;

/// Token codec backed by `jsonwebtoken`
///
/// HMAC algorithms sign with the shared secret; RSA algorithms load a
/// PEM key pair from the configured paths. Issuer and audience are
/// enforced on decode whenever configured, while expiry validation is
/// disabled: the stored record is authoritative for lifetime, and a
/// token past its `exp` must still decode so a replay of it can be
/// recognized.
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    issuer: String,
    audience: Option<String>,
}

impl std::fmt::Debug for JwtTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenCodec")
            .field("algorithm", &self.header.alg)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtTokenCodec {
    /// Creates a codec from the shared token configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Signing material plus issuer and audience settings
    ///
    /// # Returns
    ///
    /// A ready codec, or `RotationError::Internal` when the algorithm is
    /// unsupported or RSA keys cannot be loaded
    pub fn new(config: &TokenConfig) -> Result<Self, RotationError> {
        let algorithm = parse_algorithm(&config.algorithm)?;

        let (encoding_key, decoding_key) = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => (
                EncodingKey::from_secret(config.secret.as_bytes()),
                DecodingKey::from_secret(config.secret.as_bytes()),
            ),
            // parse_algorithm admits only the HMAC and RSA families
            _ => load_rsa_keys(config)?,
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        match config.audience.as_deref() {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        // The stored record decides expiry; a decode-time check would
        // hide replayed dead tokens from reuse detection.
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Ok(Self {
            encoding_key,
            decoding_key,
            header: Header::new(algorithm),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode(&self, token: &RefreshToken) -> Result<String, CodecError> {
        let claims = RefreshClaims::for_token(token, &self.issuer, self.audience.as_deref());
        encode(&self.header, &claims, &self.encoding_key).map_err(|e| CodecError::EncodingFailed {
            message: e.to_string(),
        })
    }

    fn decode(&self, raw: &str) -> Result<RefreshClaims, CodecError> {
        decode::<RefreshClaims>(raw, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }
}

fn parse_algorithm(name: &str) -> Result<Algorithm, RotationError> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        other => Err(RotationError::Internal {
            message: format!("Unsupported signing algorithm: {}", other),
        }),
    }
}

fn load_rsa_keys(config: &TokenConfig) -> Result<(EncodingKey, DecodingKey), RotationError> {
    let private_key_path =
        config
            .rsa_private_key_path
            .as_deref()
            .ok_or_else(|| RotationError::Internal {
                message: "RSA signing requires a private key path".to_string(),
            })?;
    let public_key_path =
        config
            .rsa_public_key_path
            .as_deref()
            .ok_or_else(|| RotationError::Internal {
                message: "RSA signing requires a public key path".to_string(),
            })?;

    let private_key_pem = fs::read(private_key_path).map_err(|e| RotationError::Internal {
        message: format!("Failed to read private key: {}", e),
    })?;
    let encoding_key =
        EncodingKey::from_rsa_pem(&private_key_pem).map_err(|e| RotationError::Internal {
            message: format!("Invalid private key format: {}", e),
        })?;

    let public_key_pem = fs::read(public_key_path).map_err(|e| RotationError::Internal {
        message: format!("Failed to read public key: {}", e),
    })?;
    let decoding_key =
        DecodingKey::from_rsa_pem(&public_key_pem).map_err(|e| RotationError::Internal {
            message: format!("Invalid public key format: {}", e),
        })?;

    Ok((encoding_key, decoding_key))
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> CodecError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature => CodecError::InvalidSignature,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Json(_) => CodecError::InvalidClaims {
            message: err.to_string(),
        },
        _ => CodecError::Malformed,
    }
}
