//! Adapter implementations of the store's driven ports.

pub mod file;
pub mod memory;
pub mod serializer;

pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;
pub use serializer::BincodeRecordSerializer;
