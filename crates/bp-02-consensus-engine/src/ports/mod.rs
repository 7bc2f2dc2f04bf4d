//! Ports for the consensus engine.
//!
//! - [`inbound`]: the verification API exposed to callers
//! - [`outbound`]: the external collaborators the engine depends on

pub mod inbound;
pub mod outbound;
