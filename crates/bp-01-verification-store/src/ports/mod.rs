//! Ports for the verification store.
//!
//! - [`inbound`]: the typed API the consensus engine drives
//! - [`outbound`]: the bytes-level backends the store is driven by

pub mod inbound;
pub mod outbound;
