//! Access control guard.
//!
//! Stateless checks of (caller identity, operation) against a config
//! snapshot. All denials surface as `VerificationError::Unauthorized`.

use crate::config::AdminConfig;
use shared_types::{Principal, VerificationError, VerificationResult};

/// Caller must be the configured authorized requester.
pub fn require_authorized_requester(
    config: &AdminConfig,
    caller: &Principal,
) -> VerificationResult<()> {
    if caller == &config.authorized_requester {
        Ok(())
    } else {
        Err(VerificationError::Unauthorized)
    }
}

/// Caller must be the configured admin.
pub fn require_admin(config: &AdminConfig, caller: &Principal) -> VerificationResult<()> {
    if caller == &config.admin {
        Ok(())
    } else {
        Err(VerificationError::Unauthorized)
    }
}

/// Caller must be the authorized requester or the admin (cancellation).
pub fn require_requester_or_admin(
    config: &AdminConfig,
    caller: &Principal,
) -> VerificationResult<()> {
    if caller == &config.authorized_requester || caller == &config.admin {
        Ok(())
    } else {
        Err(VerificationError::Unauthorized)
    }
}
