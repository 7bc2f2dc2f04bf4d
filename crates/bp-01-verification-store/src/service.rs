//! Verification store service.
//!
//! Typed store API layered over a bytes-level [`KeyValueStore`]. Writers
//! are serialized by a single lock, which is what makes
//! `insert_unless_pending` an atomic check-and-insert.

use crate::adapters::BincodeRecordSerializer;
use crate::domain::errors::StoreError;
use crate::ports::inbound::{StoreCounts, VerificationStore};
use crate::ports::outbound::{KeyValueStore, RecordSerializer};
use parking_lot::RwLock;
use shared_types::{VerificationKey, VerificationRecord};

/// Key prefix for verification records in the underlying KV store.
const RECORD_PREFIX: &[u8] = b"record:";

/// Store service generic over its persistence backend.
pub struct VerificationStoreService<K, S = BincodeRecordSerializer>
where
    K: KeyValueStore,
    S: RecordSerializer,
{
    kv: RwLock<K>,
    serializer: S,
}

impl<K: KeyValueStore> VerificationStoreService<K> {
    /// Create a store service with the default bincode serializer.
    pub fn new(kv: K) -> Self {
        Self::with_serializer(kv, BincodeRecordSerializer)
    }
}

impl<K, S> VerificationStoreService<K, S>
where
    K: KeyValueStore,
    S: RecordSerializer,
{
    pub fn with_serializer(kv: K, serializer: S) -> Self {
        Self {
            kv: RwLock::new(kv),
            serializer,
        }
    }

    fn storage_key(key: &VerificationKey) -> Vec<u8> {
        let mut storage_key = RECORD_PREFIX.to_vec();
        storage_key.extend_from_slice(key.encode().as_bytes());
        storage_key
    }

    /// Decode, sort by (created_at, key) and return all stored records.
    fn sorted_records(
        &self,
        kv: &K,
    ) -> Result<Vec<(VerificationKey, VerificationRecord)>, StoreError> {
        let mut records = Vec::new();
        for (_, bytes) in kv.prefix_scan(RECORD_PREFIX)? {
            let record = self.serializer.deserialize(&bytes)?;
            records.push((record.key.clone(), record));
        }
        records.sort_by(|(ka, ra), (kb, rb)| {
            ra.created_at_ms
                .cmp(&rb.created_at_ms)
                .then_with(|| ka.cmp(kb))
        });
        Ok(records)
    }
}

impl<K, S> VerificationStore for VerificationStoreService<K, S>
where
    K: KeyValueStore,
    S: RecordSerializer,
{
    fn insert_unless_pending(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        let mut kv = self.kv.write();
        let storage_key = Self::storage_key(&record.key);

        // Check and insert under one write lock: two concurrent requests
        // for the same key cannot both pass.
        if let Some(existing) = kv.get(&storage_key)? {
            let existing = self.serializer.deserialize(&existing)?;
            if !existing.is_terminal() {
                return Err(StoreError::PendingExists {
                    key: record.key.encode(),
                });
            }
            tracing::debug!(key = %record.key, "Replacing terminal record with new request");
        }

        let bytes = self.serializer.serialize(record)?;
        kv.put(&storage_key, &bytes)
    }

    fn update(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        let mut kv = self.kv.write();
        let storage_key = Self::storage_key(&record.key);
        if !kv.exists(&storage_key)? {
            return Err(StoreError::NotFound {
                key: record.key.encode(),
            });
        }
        let bytes = self.serializer.serialize(record)?;
        kv.put(&storage_key, &bytes)
    }

    fn get(&self, key: &VerificationKey) -> Result<Option<VerificationRecord>, StoreError> {
        let kv = self.kv.read();
        match kv.get(&Self::storage_key(key))? {
            Some(bytes) => Ok(Some(self.serializer.deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_history(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(VerificationKey, VerificationRecord)>, StoreError> {
        let kv = self.kv.read();
        let records = self.sorted_records(&kv)?;
        Ok(records.into_iter().skip(offset).take(limit).collect())
    }

    fn active(&self) -> Result<Vec<(VerificationKey, VerificationRecord)>, StoreError> {
        let kv = self.kv.read();
        let records = self.sorted_records(&kv)?;
        Ok(records
            .into_iter()
            .filter(|(_, r)| !r.is_terminal())
            .collect())
    }

    fn counts(&self) -> Result<StoreCounts, StoreError> {
        let kv = self.kv.read();
        let mut total = 0;
        let mut active = 0;
        for (_, bytes) in kv.prefix_scan(RECORD_PREFIX)? {
            let record = self.serializer.deserialize(&bytes)?;
            total += 1;
            if !record.is_terminal() {
                active += 1;
            }
        }
        Ok(StoreCounts { total, active })
    }
}
