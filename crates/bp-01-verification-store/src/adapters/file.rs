//! File-backed key-value backend.

use crate::domain::errors::StoreError;
use crate::ports::outbound::KeyValueStore;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// File-backed key-value store.
///
/// Persists the whole map to a single binary file after every write, via a
/// temp file and an atomic rename, so a crash mid-write leaves the previous
/// state intact. Existing state is loaded on open.
///
/// Format: repeated `[key_len: u32 LE][key][value_len: u32 LE][value]`.
pub struct FileBackedKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
}

impl FileBackedKVStore {
    /// Open (or create) a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = match Self::load_from_file(&path) {
            Ok(Some(data)) => {
                tracing::info!(
                    path = %path.display(),
                    keys = data.len(),
                    "Loaded existing verification store"
                );
                data
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "Starting empty verification store");
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        Ok(Self { data, path })
    }

    fn load_from_file(path: &Path) -> Result<Option<HashMap<Vec<u8>, Vec<u8>>>, StoreError> {
        let mut file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io {
                message: e.to_string(),
            }),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| StoreError::Io {
            message: e.to_string(),
        })?;

        let mut data = HashMap::new();
        let mut cursor = 0usize;
        while cursor < bytes.len() {
            let key = Self::read_chunk(&bytes, &mut cursor)?;
            let value = Self::read_chunk(&bytes, &mut cursor)?;
            data.insert(key, value);
        }
        Ok(Some(data))
    }

    fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, StoreError> {
        let truncated = || StoreError::Serialization {
            message: "store file truncated".to_string(),
        };
        let len_end = cursor.checked_add(4).ok_or_else(truncated)?;
        let len_bytes: [u8; 4] = bytes
            .get(*cursor..len_end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(truncated)?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let chunk_end = len_end.checked_add(len).ok_or_else(truncated)?;
        let chunk = bytes.get(len_end..chunk_end).ok_or_else(truncated)?;
        *cursor = chunk_end;
        Ok(chunk.to_vec())
    }

    fn save_to_file(&self) -> Result<(), StoreError> {
        let io_err = |e: std::io::Error| StoreError::Io {
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut bytes = Vec::new();
        for (key, value) in &self.data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }

        // Temp file + rename keeps the previous state intact on crash.
        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        self.save_to_file()
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.data.remove(key);
        self.save_to_file()
    }

    fn exists(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let results: Vec<_> = self
            .data
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }
}
