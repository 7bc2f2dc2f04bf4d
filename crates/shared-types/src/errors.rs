//! # Error Types
//!
//! The wire-level `VerificationError` taxonomy shared by every subsystem.
//! All engine-level failures are returned as these tagged values, never
//! thrown as panics, so callers can branch deterministically.

use thiserror::Error;

/// Failures surfaced to callers of the verification engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Malformed project id / version, or a duplicate in-flight request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller is not permitted to perform this operation.
    #[error("Unauthorized caller")]
    Unauthorized,

    /// No verification record exists for the requested key.
    #[error("Verification not found")]
    NotFound,

    /// The instruction source has no build instructions for this key.
    #[error("No build instructions registered for this project/version")]
    InstructionsNotFound,

    /// An executor call failed at the transport level.
    #[error("Executor failure: {0}")]
    ExecutorFailure(String),

    /// Every executor reported and no hash group reached the threshold.
    #[error("Consensus failure: no qualified majority")]
    ConsensusFailure,

    /// The verification timed out before reaching consensus.
    #[error("Verification timed out")]
    TimeoutError,

    /// Store or config invariant violation; indicates a bug.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type for verification operations.
pub type VerificationResult<T> = Result<T, VerificationError>;
