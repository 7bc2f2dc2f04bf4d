//! # Core Domain Entities
//!
//! Defines the entities that flow between BuildProof subsystems.
//!
//! ## Clusters
//!
//! - **Identity**: `Principal`
//! - **Verification**: `VerificationKey`, `VerificationRecord`,
//!   `ExecutorOutcome`, `VerificationStatus`, `FailureReason`
//! - **Build input**: `InstructionSet`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::VerificationError;

/// A content digest reported by a build executor (hex-encoded).
pub type ArtifactHash = String;

/// Unix timestamp in milliseconds.
pub type TimestampMs = u64;

/// Maximum length of a textual principal.
pub const MAX_PRINCIPAL_LEN: usize = 63;

/// Opaque identity of a caller or executor node.
///
/// Textual form: non-empty, at most [`MAX_PRINCIPAL_LEN`] characters of
/// lowercase alphanumerics and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    /// Access the textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Principal {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VerificationError::InvalidInput(
                "principal must not be empty".to_string(),
            ));
        }
        if s.len() > MAX_PRINCIPAL_LEN {
            return Err(VerificationError::InvalidInput(format!(
                "principal exceeds {MAX_PRINCIPAL_LEN} characters"
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(VerificationError::InvalidInput(format!(
                "principal contains invalid characters: {s}"
            )));
        }
        Ok(Principal(s.to_string()))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unique identity of a verification: one (project, version) pair.
///
/// At most one non-terminal [`VerificationRecord`] may exist per key at any
/// time; the store enforces this at insertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerificationKey {
    /// Project identifier (`[A-Za-z0-9_-]+`, at most 64 characters).
    pub project_id: String,
    /// Semantic version string (`MAJOR.MINOR.PATCH[-pre][+build]`).
    pub version: String,
}

impl VerificationKey {
    pub fn new(project_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            version: version.into(),
        }
    }

    /// String encoding used as the durable store key.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.project_id, self.version)
    }

    /// Inverse of [`encode`](Self::encode).
    ///
    /// The project id cannot contain `:`, so splitting on the first colon
    /// is unambiguous even though versions may contain `+build` metadata.
    pub fn decode(encoded: &str) -> Option<Self> {
        let (project_id, version) = encoded.split_once(':')?;
        if project_id.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self::new(project_id, version))
    }
}

impl fmt::Display for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_id, self.version)
    }
}

/// Verification state-machine state.
///
/// State progression: Pending → Verified | Failed. Terminal states are
/// never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VerificationStatus {
    /// Dispatched, awaiting executor reports.
    #[default]
    Pending,
    /// A qualified majority of executors agreed on one artifact hash.
    Verified,
    /// No majority, timed out, or cancelled.
    Failed,
}

impl VerificationStatus {
    /// Verified and Failed are terminal; no further transitions occur.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VerificationStatus::Pending)
    }
}

/// Why a verification ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Every executor reported, no hash group reached the threshold.
    Consensus,
    /// The timeout fired before consensus was reached.
    Timeout,
    /// Explicitly cancelled by the requester or an admin.
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Consensus => f.write_str("consensus_failure"),
            FailureReason::Timeout => f.write_str("timeout"),
            FailureReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// One executor's slot in a verification.
///
/// Slots are pre-allocated at record creation (one per dispatched executor)
/// and flip `completed` false → true exactly once. Late reports against a
/// terminal record still land in their slot for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorOutcome {
    /// Endpoint identity of the executor this slot belongs to.
    pub executor_id: Principal,
    /// Content digest, present only if the executor completed without error.
    pub hash: Option<ArtifactHash>,
    /// Failure message, present only if the executor reported an error.
    pub error: Option<String>,
    /// Whether this executor has reported (success or error).
    pub completed: bool,
    /// Wall-clock build duration reported by the executor.
    pub execution_time_ms: Option<u64>,
    /// Monotonic completion order within the record, set when `completed`
    /// flips. Used as the deterministic tie-break between hash groups.
    pub completion_index: Option<u64>,
}

impl ExecutorOutcome {
    /// A fresh, not-yet-reported slot for `executor_id`.
    pub fn pending(executor_id: Principal) -> Self {
        Self {
            executor_id,
            hash: None,
            error: None,
            completed: false,
            execution_time_ms: None,
            completion_index: None,
        }
    }
}

/// Minimum count of matching-hash reports required to accept a result.
///
/// `ceil(total × 0.51)` in integer arithmetic: N=1→1, N=3→2, N=5→3.
/// Strictly greater than half of `total` for every `total ≥ 1`, so two
/// distinct hash groups can never both reach it.
pub fn consensus_threshold(total_executors: usize) -> usize {
    (total_executors * 51).div_ceil(100)
}

/// The full state of one verification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Identity of this verification.
    pub key: VerificationKey,
    /// Current state-machine state.
    pub status: VerificationStatus,
    /// One slot per dispatched executor; fixed length for the life of the
    /// record (`executor_outcomes.len() == total_executors`).
    pub executor_outcomes: Vec<ExecutorOutcome>,
    /// Number of executors dispatched (≥ 1).
    pub total_executors: usize,
    /// Matching-report count required for Verified; computed once at
    /// creation and immutable afterwards.
    pub consensus_threshold: usize,
    /// Size of the largest same-hash group among completed outcomes,
    /// recomputed on every update.
    pub matching_results: usize,
    /// The agreed hash, set only on transition to Verified.
    pub verified_hash: Option<ArtifactHash>,
    /// Failure tag, set only on transition to Failed.
    pub failure: Option<FailureReason>,
    /// Creation timestamp.
    pub created_at_ms: TimestampMs,
    /// Set exactly once, on transition to a terminal state.
    pub completed_at_ms: Option<TimestampMs>,
}

impl VerificationRecord {
    /// Allocate a new Pending record with one empty slot per executor.
    pub fn new(key: VerificationKey, executors: &[Principal], created_at_ms: TimestampMs) -> Self {
        let executor_outcomes: Vec<ExecutorOutcome> = executors
            .iter()
            .cloned()
            .map(ExecutorOutcome::pending)
            .collect();
        let total_executors = executor_outcomes.len();
        Self {
            key,
            status: VerificationStatus::Pending,
            executor_outcomes,
            total_executors,
            consensus_threshold: consensus_threshold(total_executors),
            matching_results: 0,
            verified_hash: None,
            failure: None,
            created_at_ms,
            completed_at_ms: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The slot belonging to `executor_id`, if this executor was dispatched.
    pub fn outcome_mut(&mut self, executor_id: &Principal) -> Option<&mut ExecutorOutcome> {
        self.executor_outcomes
            .iter_mut()
            .find(|o| &o.executor_id == executor_id)
    }

    /// Number of executors that have reported (success or error).
    pub fn completed_count(&self) -> usize {
        self.executor_outcomes.iter().filter(|o| o.completed).count()
    }

    /// Whether every dispatched executor has reported.
    pub fn all_completed(&self) -> bool {
        self.completed_count() == self.total_executors
    }
}

/// Build instructions for one (project, version), read from the external
/// Instruction Source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSet {
    pub project_id: String,
    pub version: String,
    /// Ordered shell instructions; execution is the executor's concern.
    pub instructions: Vec<String>,
}
