//! Unified error types for the secp256k1 engine
//!
//! Validation errors are raised by the codec and the marshaling layer before
//! any backend call and can always be fixed by the caller. Backend and
//! lifecycle errors mean the input passed validation but the curve backend
//! refused it, or the context is gone.

/// Main error type for all engine operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid length for {field}: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid scalar for {0}: must be non-zero and below the curve order")]
    InvalidScalar(&'static str),

    #[error("Backend operation failed: {0}")]
    BackendOperationFailed(&'static str),

    #[error("Hardened derivation requires a private key")]
    PrivateKeyRequired,

    #[error("Result of {0} is the point at infinity")]
    PointAtInfinity(&'static str),

    #[error("Invalid recovery id {0}: must be 0, 1, 2 or 3")]
    InvalidRecoveryId(u8),

    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Maximum derivation depth (255) exceeded")]
    MaxDepthExceeded,

    #[error("Curve context has been released")]
    ContextReleased,
}

impl EngineError {
    pub(crate) fn invalid_length(field: &'static str, expected: &'static str, actual: usize) -> Self {
        Self::InvalidLength { field, expected, actual }
    }

    pub(crate) fn invalid_encoding(msg: impl Into<String>) -> Self {
        Self::InvalidEncoding(msg.into())
    }

    /// True for errors caused by malformed caller input.
    ///
    /// These are detected before the backend is touched; everything else is
    /// a backend refusal or a lifecycle problem.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidLength { .. }
                | Self::InvalidEncoding(_)
                | Self::InvalidScalar(_)
                | Self::InvalidRecoveryId(_)
                | Self::InvalidPath(_)
                | Self::PrivateKeyRequired
                | Self::MaxDepthExceeded
        )
    }

    /// Short machine-readable code, used as a log field
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidLength { .. } => "invalid_length",
            Self::InvalidEncoding(_) => "invalid_encoding",
            Self::InvalidScalar(_) => "invalid_scalar",
            Self::BackendOperationFailed(_) => "backend_operation_failed",
            Self::PrivateKeyRequired => "private_key_required",
            Self::PointAtInfinity(_) => "point_at_infinity",
            Self::InvalidRecoveryId(_) => "invalid_recovery_id",
            Self::InvalidPath(_) => "invalid_path",
            Self::MaxDepthExceeded => "max_depth_exceeded",
            Self::ContextReleased => "context_released",
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl From<bs58::decode::Error> for EngineError {
    fn from(e: bs58::decode::Error) -> Self {
        EngineError::InvalidEncoding(format!("Base58Check: {}", e))
    }
}
