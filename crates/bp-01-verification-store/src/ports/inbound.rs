//! Driving Port (API - Inbound)
//!
//! The typed store interface consumed by the consensus engine. No other
//! component writes to the store.

use crate::domain::errors::StoreError;
use shared_types::{VerificationKey, VerificationRecord};

/// Record counts for engine info reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    /// All records, terminal and pending alike.
    pub total: usize,
    /// Records with Pending status.
    pub active: usize,
}

/// Durable keyed map from [`VerificationKey`] to [`VerificationRecord`].
///
/// Implementations take `&self` and serialize writers internally; every
/// method is atomic with respect to the others.
pub trait VerificationStore: Send + Sync {
    /// Insert `record`, failing with [`StoreError::PendingExists`] iff a
    /// Pending record already occupies the key.
    ///
    /// The existence check and the insert are a single atomic step - this
    /// is the deduplication guard that upholds the at-most-one-Pending
    /// invariant under concurrent requests. A *terminal* record for the
    /// same key is replaced (re-verification of a finished version is
    /// allowed).
    fn insert_unless_pending(&self, record: &VerificationRecord) -> Result<(), StoreError>;

    /// Point update of an existing record.
    fn update(&self, record: &VerificationRecord) -> Result<(), StoreError>;

    /// Point read.
    fn get(&self, key: &VerificationKey) -> Result<Option<VerificationRecord>, StoreError>;

    /// Paginated scan over all records, ordered by `created_at_ms`
    /// ascending with the key as a stable tie-break.
    fn scan_history(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(VerificationKey, VerificationRecord)>, StoreError>;

    /// All records with Pending status, in history order.
    fn active(&self) -> Result<Vec<(VerificationKey, VerificationRecord)>, StoreError>;

    /// Total and active record counts.
    fn counts(&self) -> Result<StoreCounts, StoreError>;
}
