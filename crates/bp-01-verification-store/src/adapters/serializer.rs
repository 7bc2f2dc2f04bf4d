//! Record serialization adapter.

use crate::domain::errors::StoreError;
use crate::ports::outbound::RecordSerializer;
use shared_types::VerificationRecord;

/// Default record serializer using bincode.
#[derive(Default)]
pub struct BincodeRecordSerializer;

impl RecordSerializer for BincodeRecordSerializer {
    fn serialize(&self, record: &VerificationRecord) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(record).map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })
    }

    fn deserialize(&self, data: &[u8]) -> Result<VerificationRecord, StoreError> {
        bincode::deserialize(data).map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })
    }
}
