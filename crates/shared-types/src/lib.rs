//! # Shared Types Crate
//!
//! This crate contains the domain entities and the `VerificationError`
//! taxonomy shared across all BuildProof subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Plain Data**: Entities carry data and cheap helpers; the consensus
//!   math that interprets them lives in the engine crate.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
