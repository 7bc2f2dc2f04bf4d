//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Bytes-level interfaces the store service is built on.

use crate::domain::errors::StoreError;
use shared_types::VerificationRecord;

/// Abstract interface for key-value persistence.
///
/// Production: [`FileBackedKVStore`](crate::adapters::FileBackedKVStore)
/// Testing: [`InMemoryKVStore`](crate::adapters::InMemoryKVStore)
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, StoreError>;

    /// Iterate over entries whose key starts with `prefix`.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;
}

/// Abstract interface for record serialization.
pub trait RecordSerializer: Send + Sync {
    /// Serialize a record to bytes.
    fn serialize(&self, record: &VerificationRecord) -> Result<Vec<u8>, StoreError>;

    /// Deserialize bytes to a record.
    fn deserialize(&self, data: &[u8]) -> Result<VerificationRecord, StoreError>;
}
