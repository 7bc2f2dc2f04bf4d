//! # bp-02-consensus-engine
//!
//! Build Verification Consensus Engine: coordinates independent build
//! executors to produce a cross-verified, reproducible artifact hash.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Fan-out dispatch**: one asynchronous build call per configured
//!   executor endpoint, no blocking on completion
//! - **Qualified majority**: a result is Verified once `ceil(N × 0.51)`
//!   executors report the same artifact hash
//! - **Bounded outcome**: every verification terminates - by consensus, by
//!   exhaustion (all reported, no majority), or by timeout
//! - **Single writer per key**: all record mutation is serialized, so
//!   executor callbacks, timeouts, and cancellation never race
//!
//! ## Architecture
//!
//! ```text
//! caller ──→ Access Guard (3) ──→ Consensus Engine (2)
//!                                       │
//!                                       ├── get_instructions ──→ Instruction Source (ext)
//!                                       ├── execute ×N ──→ Build Executors (ext)
//!                                       ├── schedule_once/cancel ──→ Timer Facility
//!                                       └── insert/update/get ──→ Verification Store (1)
//! ```
//!
//! ## State machine
//!
//! ```text
//! [PENDING] ──majority reached──→ [VERIFIED]
//!     │
//!     ├──all reported, no majority──→ [FAILED consensus_failure]
//!     ├──timer fired──────────────→ [FAILED timeout]
//!     └──cancelled────────────────→ [FAILED cancelled]
//! ```
//!
//! Terminal records still absorb late executor reports for audit, but never
//! transition again.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bp_02_consensus_engine::{ConsensusEngine, VerificationApi};
//!
//! let engine = ConsensusEngine::new(store, instructions, executor, timer, clock, config);
//!
//! let record = engine
//!     .request_verification(&requester, "my-project", "1.2.0", None)
//!     .await?;
//! assert_eq!(record.status, VerificationStatus::Pending);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::{SystemTimeSource, TokioTimerFacility};
pub use domain::consensus::{consensus_threshold, evaluate, ConsensusDecision};
pub use domain::validation::{validate_project_id, validate_version};
pub use error::{VerificationError, VerificationResult};
pub use ports::inbound::{EngineInfo, VerificationApi, DEFAULT_HISTORY_LIMIT, DEFAULT_TIMEOUT_SECS};
pub use ports::outbound::{
    BuildExecutor, ExecutorVerdict, InstructionSource, TimeSource, TimerFacility, TimerFired,
    TimerId,
};
pub use service::{spawn_timeout_worker, ConsensusEngine, DispatchId};
