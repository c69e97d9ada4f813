use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Single-file key-value store.
///
/// The whole map is held in memory and rewritten on every mutation through
/// a temp file and rename, so a crash leaves either the old or the new file.
/// Suitable for development nodes without RocksDB.
///
/// File format: `([key_len:u32 LE][key][value_len:u32 LE][value])*`.
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
}

impl FileBackedKVStore {
    /// Open the store at `path`, creating it on first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match std::fs::File::open(&path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).map_err(io_error)?;
                let data = decode(&bytes)?;
                tracing::info!(
                    "[nr-01] 💾 Loaded {} keys from {} ({} bytes)",
                    data.len(),
                    path.display(),
                    bytes.len()
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("[nr-01] 📁 No existing registry file at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(io_error(e)),
        };

        Ok(Self { data, path })
    }

    fn save_to_file(&self) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut bytes = Vec::new();
        for (key, value) in &self.data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;

        Ok(())
    }

    /// Apply `apply` to a copy of the map and persist it. The in-memory map
    /// is only replaced once the file write succeeded.
    fn commit(
        &mut self,
        apply: impl FnOnce(&mut BTreeMap<Vec<u8>, Vec<u8>>),
    ) -> Result<(), KVStoreError> {
        let previous = self.data.clone();
        apply(&mut self.data);
        if let Err(e) = self.save_to_file() {
            self.data = previous;
            return Err(e);
        }
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

fn decode(bytes: &[u8]) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
    let mut data = BTreeMap::new();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let key = read_field(bytes, &mut cursor)?;
        let value = read_field(bytes, &mut cursor)?;
        data.insert(key, value);
    }

    Ok(data)
}

fn read_field(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
    let truncated = || KVStoreError::CorruptionError {
        message: format!("registry file truncated at offset {}", cursor),
    };

    let len_end = cursor.checked_add(4).ok_or_else(truncated)?;
    let len_bytes: [u8; 4] = bytes
        .get(*cursor..len_end)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(truncated)?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    let end = len_end.checked_add(len).ok_or_else(truncated)?;
    let field = bytes.get(len_end..end).ok_or_else(truncated)?.to_vec();
    *cursor = end;
    Ok(field)
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.commit(|data| {
            data.insert(key.to_vec(), value.to_vec());
        })
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.commit(|data| {
            data.remove(key);
        })
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.commit(|data| {
            for op in operations {
                match op {
                    BatchOperation::Put { key, value } => {
                        data.insert(key, value);
                    }
                    BatchOperation::Delete { key } => {
                        data.remove(&key);
                    }
                }
            }
        })
    }
}
