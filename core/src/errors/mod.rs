//! Error taxonomy for the rotation engine and its collaborators.
//!
//! Callers receive a `RotationError`; the store and codec layers have
//! their own narrower enums that the engine folds into the taxonomy at
//! its boundary. Codes are stable and documented, but every
//! authentication-kind failure presents to end clients the same way:
//! re-authentication required.

use thiserror::Error;

use tw_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

/// Errors surfaced by rotation engine operations
///
/// Every variant is terminal for the call that produced it; the engine
/// never retries internally.
#[derive(Error, Debug)]
pub enum RotationError {
    /// Request was malformed before any lookup happened
    #[error("Validation failed for field: {field}")]
    Validation { field: String },

    /// Presented string failed decoding or signature verification
    #[error("Refresh token is invalid")]
    InvalidToken,

    /// No stored record matches the presented token
    #[error("Refresh token not found")]
    NotFound,

    /// Token record exists but its lifetime has passed
    #[error("Refresh token expired")]
    Expired,

    /// A consumed or revoked token was presented again
    #[error("Refresh token reuse detected")]
    ReuseDetected,

    /// Presented client context does not match the bound context
    #[error("Refresh token context mismatch")]
    ContextMismatch,

    /// The token store could not serve the request
    #[error("Token store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// An invariant the engine relies on was broken
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RotationError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            RotationError::Validation { .. } => error_codes::VALIDATION_ERROR,
            RotationError::InvalidToken => error_codes::INVALID_REFRESH_TOKEN,
            RotationError::NotFound => error_codes::REFRESH_TOKEN_NOT_FOUND,
            RotationError::Expired => error_codes::REFRESH_TOKEN_EXPIRED,
            RotationError::ReuseDetected => error_codes::REFRESH_TOKEN_REUSE_DETECTED,
            RotationError::ContextMismatch => error_codes::REFRESH_TOKEN_CONTEXT_MISMATCH,
            RotationError::StoreUnavailable { .. } => error_codes::STORE_UNAVAILABLE,
            RotationError::Internal { .. } => error_codes::INTERNAL_ERROR,
        }
    }

    /// Whether the caller must send the user back through login
    ///
    /// True for every failure that invalidates the presented credential.
    /// Validation and availability failures leave the credential usable.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            RotationError::InvalidToken
                | RotationError::NotFound
                | RotationError::Expired
                | RotationError::ReuseDetected
                | RotationError::ContextMismatch
        )
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, RotationError::StoreUnavailable { .. })
    }
}

impl From<StoreError> for RotationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { message } => RotationError::StoreUnavailable { message },
            StoreError::DuplicateTokenId { token_id } => RotationError::Internal {
                message: format!("Duplicate token id on insert: {}", token_id),
            },
        }
    }
}

impl From<&RotationError> for ErrorResponse {
    fn from(err: &RotationError) -> Self {
        // Auth-kind failures share one client-facing message so the
        // response does not reveal which check rejected the token.
        let message = if err.requires_reauthentication() {
            "Re-authentication required".to_string()
        } else {
            err.to_string()
        };
        ErrorResponse::new(err.code(), message)
    }
}

impl IntoErrorResponse for RotationError {
    fn to_error_response(&self) -> ErrorResponse {
        self.into()
    }
}

/// Errors produced by token store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached or failed mid-operation
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// Insert collided with an existing token ID
    #[error("Duplicate token id: {token_id}")]
    DuplicateTokenId { token_id: String },
}

/// Errors produced by token codec implementations
#[derive(Error, Debug)]
pub enum CodecError {
    /// Input is not a structurally valid token
    #[error("Malformed token")]
    Malformed,

    /// Signature did not verify against the configured key
    #[error("Token signature verification failed")]
    InvalidSignature,

    /// Token verified but its claims are unusable
    #[error("Invalid token claims: {message}")]
    InvalidClaims { message: String },

    /// Signing failed while producing a token
    #[error("Token encoding failed: {message}")]
    EncodingFailed { message: String },
}

pub type RotationResult<T> = Result<T, RotationError>;
