//! Domain module for the consensus engine.
//!
//! Pure, deterministic logic with no I/O:
//! - validation: project id and semantic version checks
//! - consensus: threshold math and majority evaluation

pub mod consensus;
pub mod validation;

pub use consensus::{consensus_threshold, evaluate, ConsensusDecision};
pub use validation::{validate_project_id, validate_version, MAX_PROJECT_ID_LEN};
