//! Token codec trait defining the signed wire form of refresh tokens.

use crate::domain::entities::token::RefreshToken;
use crate::errors::CodecError;

use super::claims::RefreshClaims;

/// Codec between stored token records and their signed transportable form
///
/// Encoding and decoding are pure computation; implementations never
/// touch the store. Decode verifies authenticity and structure but not
/// expiry: the engine judges expiry against the stored record so that
/// replays of dead tokens still reach reuse detection.
pub trait TokenCodec: Send + Sync {
    /// Signs a token record into the string handed to clients
    ///
    /// # Arguments
    /// * `token` - The record to seal
    ///
    /// # Returns
    /// * `Ok(String)` - The signed bearer string
    /// * `Err(CodecError::EncodingFailed)` - Signing failed
    fn encode(&self, token: &RefreshToken) -> Result<String, CodecError>;

    /// Verifies a presented string and recovers its claims
    ///
    /// # Arguments
    /// * `raw` - The bearer string as presented by the client
    ///
    /// # Returns
    /// * `Ok(RefreshClaims)` - The authenticated claim set
    /// * `Err(CodecError)` - Structure, signature, or claim validation failed
    fn decode(&self, raw: &str) -> Result<RefreshClaims, CodecError>;
}
