//! Error types for the blecore library.

use thiserror::Error;

use crate::substrate::SubmitError;

/// Status codes reported by the remote stack in response messages.
///
/// Everything except [`RemoteStatus::Success`] is passed through to the
/// caller verbatim; this layer does not interpret failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Operation completed successfully.
    Success,
    /// Unspecified failure.
    Failure,
    /// Bonding procedure failed.
    BondingFailed,
    /// Attribute or connection handle was not recognized.
    InvalidHandle,
    /// Stack ran out of resources for the request.
    InsufficientResources,
    /// Operation is not supported by the stack.
    NotSupported,
    /// Any other stack-specific code.
    Other(u8),
}

impl RemoteStatus {
    /// Returns true for [`RemoteStatus::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::BondingFailed => write!(f, "bonding failed"),
            Self::InvalidHandle => write!(f, "invalid handle"),
            Self::InsufficientResources => write!(f, "insufficient resources"),
            Self::NotSupported => write!(f, "not supported"),
            Self::Other(code) => write!(f, "stack error 0x{code:02x}"),
        }
    }
}

/// The main error type for blecore operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The messaging substrate refused to accept the request.
    #[error("submission refused: {0}")]
    Submit(#[from] SubmitError),

    /// No matching response arrived before the deadline.
    #[error("response timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Operation requires an active connection but none exists.
    #[error("wrong state: no active connection")]
    WrongState,

    /// The remote stack reported a non-success status.
    #[error("remote stack reported: {0}")]
    Remote(RemoteStatus),

    /// A response arrived without the payload its kind promises.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The inbound message channel is gone.
    #[error("messaging substrate closed")]
    Closed,
}

/// Result type alias for blecore operations.
pub type Result<T> = std::result::Result<T, Error>;
