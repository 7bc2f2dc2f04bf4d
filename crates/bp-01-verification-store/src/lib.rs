//! # bp-01-verification-store
//!
//! Durable keyed map from (project, version) to its verification record.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Atomic dedup insert**: `insert_unless_pending` is the single guard
//!   that enforces at most one Pending record per key
//! - **Point read/update**: the consensus engine is the only writer
//! - **Ordered history scan**: records listed by creation time, ascending
//!
//! ## Architecture
//!
//! ```text
//! Consensus Engine (2) ──VerificationStore──→ Store Service (1)
//!                                                  │
//!                                                  └── KeyValueStore ──→ memory | file
//! ```
//!
//! The typed [`VerificationStore`](ports::inbound::VerificationStore) port
//! sits over a bytes-level [`KeyValueStore`](ports::outbound::KeyValueStore)
//! so the persistence backend stays swappable.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{BincodeRecordSerializer, FileBackedKVStore, InMemoryKVStore};
pub use domain::errors::StoreError;
pub use ports::inbound::{StoreCounts, VerificationStore};
pub use ports::outbound::{KeyValueStore, RecordSerializer};
pub use service::VerificationStoreService;
