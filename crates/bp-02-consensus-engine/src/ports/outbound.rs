//! Driven Ports (SPI - Outbound Dependencies)
//!
//! External collaborators the engine is wired to: the instruction source,
//! the per-executor RPC stub, the timer facility, and the clock.

use async_trait::async_trait;
use shared_types::{
    ArtifactHash, InstructionSet, Principal, TimestampMs, VerificationKey, VerificationResult,
};
use uuid::Uuid;

/// Identifier of one armed timer.
pub type TimerId = Uuid;

/// External catalog of build instructions per (project, version).
#[async_trait]
pub trait InstructionSource: Send + Sync {
    /// `Ok(None)` means no instructions are registered for this key.
    async fn get_instructions(
        &self,
        project_id: &str,
        version: &str,
    ) -> VerificationResult<Option<InstructionSet>>;
}

/// Result of one executor's build attempt.
///
/// An executor that never responds produces no verdict at all - that case
/// is handled exclusively by the timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorVerdict {
    /// Build completed; the executor reports its artifact digest.
    Completed {
        hash: ArtifactHash,
        execution_time_ms: u64,
    },
    /// Build failed; the error is recorded in the outcome slot and the
    /// executor contributes no hash to any group.
    Failed {
        error: String,
        execution_time_ms: Option<u64>,
    },
}

/// RPC stub over the pool of build executors.
///
/// One `execute` call per endpoint per verification; calls may complete in
/// any order, after any delay, or never.
#[async_trait]
pub trait BuildExecutor: Send + Sync {
    async fn execute(&self, endpoint: &Principal, instructions: &InstructionSet)
        -> ExecutorVerdict;
}

/// A fired timer, as delivered to the timeout worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    pub key: VerificationKey,
    /// Identifies *which* armed timer fired, so a stale timer from a
    /// superseded verification of the same key is ignored.
    pub timer_id: TimerId,
}

/// Cancelable one-shot timer facility.
pub trait TimerFacility: Send + Sync {
    /// Arm a one-shot timer; after `delay_ms` the (key, timer id) pair is
    /// delivered to the timeout worker.
    fn schedule_once(&self, delay_ms: u64, key: VerificationKey) -> TimerId;

    /// Disarm a timer. Returns `false` if it already fired or was never
    /// armed.
    fn cancel(&self, timer_id: &TimerId) -> bool;
}

/// Abstract clock, for deterministic tests.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> TimestampMs;
}
