//! Error types for the consensus engine.
//!
//! The engine surfaces the shared wire-level taxonomy directly; store-level
//! failures are mapped where they occur in the service.

pub use shared_types::{VerificationError, VerificationResult};
