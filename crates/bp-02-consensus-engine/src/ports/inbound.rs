//! Driving Port (API - Inbound)
//!
//! The verification surface exposed to callers (CLI and other clients).
//! Every operation returns a tagged `VerificationError` rather than
//! panicking, so callers can branch deterministically.

use async_trait::async_trait;
use shared_types::{
    Principal, TimestampMs, VerificationKey, VerificationRecord, VerificationResult,
};

/// Default verification timeout when the caller does not supply one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Default page size for history listings.
pub const DEFAULT_HISTORY_LIMIT: u64 = 50;

/// Engine deployment and load summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    /// Engine build/version tag.
    pub version: String,
    /// When this engine instance was configured.
    pub deployed_at_ms: TimestampMs,
    /// All records, terminal and pending alike.
    pub total_verifications: usize,
    /// Records still Pending.
    pub active_verifications: usize,
    /// Currently configured executor endpoints.
    pub executor_endpoints: Vec<Principal>,
    /// Currently configured instruction source.
    pub instruction_source: Principal,
}

/// Primary verification API.
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Start a verification for (project, version).
    ///
    /// Fire-and-dispatch: fans work out to every configured executor, arms
    /// the timeout, and returns the freshly created Pending record without
    /// waiting for any executor to finish.
    ///
    /// Preconditions, checked in order, leaving no partial state behind:
    /// caller is the authorized requester; project id and version are
    /// well-formed; instructions exist for the key; no Pending record
    /// already occupies the key.
    async fn request_verification(
        &self,
        caller: &Principal,
        project_id: &str,
        version: &str,
        timeout_secs: Option<u64>,
    ) -> VerificationResult<VerificationRecord>;

    /// Current record for (project, version), or `NotFound`.
    async fn get_verification_status(
        &self,
        project_id: &str,
        version: &str,
    ) -> VerificationResult<VerificationRecord>;

    /// Cancel a Pending verification. Caller must be the authorized
    /// requester or the admin. The record transitions to
    /// Failed(cancelled) and is retained for audit.
    async fn cancel_verification(
        &self,
        caller: &Principal,
        project_id: &str,
        version: &str,
    ) -> VerificationResult<()>;

    /// Paginated listing over all records, terminal and pending alike,
    /// ordered by creation time ascending.
    async fn list_verification_history(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> VerificationResult<Vec<(VerificationKey, VerificationRecord)>>;

    /// All records still Pending.
    async fn get_active_verifications(
        &self,
    ) -> VerificationResult<Vec<(VerificationKey, VerificationRecord)>>;

    /// Deployment and load summary.
    async fn get_engine_info(&self) -> VerificationResult<EngineInfo>;
}
